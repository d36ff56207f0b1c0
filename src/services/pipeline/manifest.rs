//! HTML manifest of everything packed in a run.

use std::sync::Mutex;

const MANIFEST_HEADER: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Packed mods</title></head><body><table><thead><tr><th>Modname</th><th>Modslug</th><th>Version</th></tr></thead><tbody>";
const MANIFEST_FOOTER: &str = "</tbody></table></body></html>";

/// Append-only row collector, safe for concurrent append from packing units.
/// Row order is completion order and therefore not stable across runs.
#[derive(Default)]
pub struct ManifestBuilder {
    rows: Mutex<Vec<String>>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&self, name: &str, slug: &str, version: &str) {
        let row = format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(name),
            escape(slug),
            escape(version)
        );
        self.rows.lock().unwrap().push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Render the full document.
    pub fn to_html(&self) -> String {
        let rows = self.rows.lock().unwrap();
        let mut html = String::with_capacity(
            MANIFEST_HEADER.len() + MANIFEST_FOOTER.len() + rows.iter().map(String::len).sum::<usize>() + rows.len(),
        );
        html.push_str(MANIFEST_HEADER);
        for row in rows.iter() {
            html.push('\n');
            html.push_str(row);
        }
        html.push('\n');
        html.push_str(MANIFEST_FOOTER);
        html
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
