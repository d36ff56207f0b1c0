//! Descriptor parsing across the three known schema variants.
//!
//! Resolution order is fixed and deliberate: the forge v1 array format (A) is
//! by far the most common and is tried first, then the forge v2 wrapper object
//! (B), then the liteloader descriptor (C). A text none of them accepts fails
//! with `UnrecognizedDescriptorFormat` and the pipeline falls back to a blank
//! record.

use serde::Deserialize;

use crate::types::{CoreError, CoreResult, ModRecord};

/// Schema A element / schema B list element: one forge `mcmod.info` object.
/// Everything defaults so partially filled descriptors still resolve.
#[derive(Debug, Deserialize, Default)]
struct ForgeDescriptor {
    #[serde(default)]
    modid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    mcversion: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    /// Newer descriptors use `authorList`, older ones `authors`.
    #[serde(default, rename = "authorList")]
    author_list: Vec<String>,
    #[serde(default)]
    authors: Vec<String>,
}

impl From<ForgeDescriptor> for ModRecord {
    fn from(d: ForgeDescriptor) -> Self {
        let authors = if d.author_list.is_empty() {
            d.authors
        } else {
            d.author_list
        };
        ModRecord {
            id: d.modid,
            name: d.name,
            version: d.version,
            game_version: d.mcversion,
            url: d.url,
            description: d.description,
            authors,
            ..ModRecord::default()
        }
    }
}

/// Schema B: `{"modListVersion": 2, "modList": [..]}`. The `modList` key is
/// required, so arbitrary JSON objects do not resolve as this variant.
#[derive(Debug, Deserialize)]
struct ForgeModList {
    #[serde(default, rename = "modListVersion")]
    _mod_list_version: u32,
    #[serde(rename = "modList")]
    mod_list: Vec<ForgeDescriptor>,
}

/// Schema C: `litemod.json`. `name` and `version` are required; a liteloader
/// mod always carries both.
#[derive(Debug, Deserialize)]
struct LiteModDescriptor {
    name: String,
    version: String,
    #[serde(default)]
    mcversion: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
}

impl From<LiteModDescriptor> for ModRecord {
    fn from(d: LiteModDescriptor) -> Self {
        let authors = if d.author.is_empty() {
            Vec::new()
        } else {
            vec![d.author]
        };
        ModRecord {
            id: d.name.to_lowercase(),
            name: d.name,
            version: d.version,
            game_version: d.mcversion,
            url: d.url,
            description: d.description,
            authors,
            ..ModRecord::default()
        }
    }
}

/// Resolve raw descriptor text into a canonical record, trying schema A, then
/// B, then C.
pub fn parse_descriptor(text: &str) -> CoreResult<ModRecord> {
    if let Ok(list) = serde_json::from_str::<Vec<ForgeDescriptor>>(text) {
        if let Some(first) = list.into_iter().next() {
            return Ok(first.into());
        }
    }
    if let Ok(wrapper) = serde_json::from_str::<ForgeModList>(text) {
        if let Some(first) = wrapper.mod_list.into_iter().next() {
            return Ok(first.into());
        }
    }
    if let Ok(lite) = serde_json::from_str::<LiteModDescriptor>(text) {
        return Ok(lite.into());
    }
    Err(CoreError::UnrecognizedDescriptorFormat)
}

#[cfg(test)]
#[path = "tests/descriptor_tests.rs"]
mod tests;
