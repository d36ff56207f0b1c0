//! Canonical representation of one discoverable mod.
//!
//! A record is keyed by the blake3 digest of its binary: two records with the
//! same `content_hash` are the same mod revision and collapse to one store
//! entry. Equality is structural over every field (derived, so new fields can
//! never be silently left out of comparisons).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Permission level required to redistribute a mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PermissionPolicy {
    Open,
    Notify,
    Request,
    #[default]
    Unknown,
    Ftb,
    Closed,
}

/// One mod archive's metadata, as persisted in the store snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ModRecord {
    /// Mod slug, e.g. `ironchests`.
    pub id: String,
    pub name: String,
    pub version: String,
    /// Version of the game the mod targets.
    pub game_version: String,
    pub url: String,
    pub description: String,
    /// Ordered author list; order is preserved from the descriptor.
    pub authors: Vec<String>,
    pub public_policy: PermissionPolicy,
    pub private_policy: PermissionPolicy,
    /// blake3 digest of the mod binary. Identity key in the store.
    pub content_hash: String,
    /// Where the binary was discovered this run.
    pub source_path: Option<PathBuf>,
    /// Metadata was typed in by a user rather than parsed or fetched.
    pub from_user_input: bool,
    /// Metadata came from a prior enrichment query; never re-submitted.
    pub from_suggestion: bool,
    /// Already packaged and cataloged; lets later runs skip the file.
    pub published: bool,
}

impl ModRecord {
    /// A record is complete when every field required for packing is present.
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty()
            && !self.name.is_empty()
            && !self.version.is_empty()
            && !self.game_version.is_empty()
    }

    /// Filesystem-safe slug used for output paths: `|` stripped and lowercased,
    /// then sanitized.
    pub fn normalized_id(&self) -> String {
        sanitize_filename::sanitize(self.id.replace('|', "").to_lowercase())
    }

    /// Combined version string used in output archive names and the catalog,
    /// `<game_version>-<version>` lowercased.
    pub fn packaged_version(&self) -> String {
        format!("{}-{}", self.game_version, self.version).to_lowercase()
    }

    /// Fill empty descriptive fields from `other`, leaving populated fields
    /// untouched. Returns whether anything was taken.
    pub fn merge_missing(&mut self, other: &ModRecord) -> bool {
        let mut changed = false;
        let mut take = |dst: &mut String, src: &String| {
            if dst.is_empty() && !src.is_empty() {
                *dst = src.clone();
                changed = true;
            }
        };
        take(&mut self.id, &other.id);
        take(&mut self.name, &other.name);
        take(&mut self.version, &other.version);
        take(&mut self.game_version, &other.game_version);
        take(&mut self.url, &other.url);
        take(&mut self.description, &other.description);
        if self.authors.is_empty() && !other.authors.is_empty() {
            self.authors = other.authors.clone();
            changed = true;
        }
        if self.public_policy == PermissionPolicy::Unknown
            && other.public_policy != PermissionPolicy::Unknown
        {
            self.public_policy = other.public_policy;
            changed = true;
        }
        if self.private_policy == PermissionPolicy::Unknown
            && other.private_policy != PermissionPolicy::Unknown
        {
            self.private_policy = other.private_policy;
            changed = true;
        }
        changed
    }
}

/// Derive a mod slug from an archive file name, for mods shipping no usable
/// descriptor. Leading name tokens are kept up to the first version-looking
/// token, so `IronChests-1.7.10-6.0.62.jar` becomes `ironchests`.
pub fn infer_slug(file_name: &str) -> String {
    let mut stem = file_name;
    // `.disabled` wraps the real extension, strip it first
    if let Some(s) = stem.strip_suffix(".disabled") {
        stem = s;
    }
    if let Some((s, _ext)) = stem.rsplit_once('.') {
        stem = s;
    }

    let mut parts: Vec<&str> = Vec::new();
    for token in stem.split(['-', '_', ' ']) {
        if token.is_empty() {
            continue;
        }
        if looks_like_version(token) {
            break;
        }
        parts.push(token);
    }

    let joined = if parts.is_empty() {
        stem.to_string()
    } else {
        parts.join("")
    };
    joined
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

fn looks_like_version(token: &str) -> bool {
    let token = token.strip_prefix(['v', 'V']).unwrap_or(token);
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
