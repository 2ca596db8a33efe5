use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;

/// Key injected into every entry, always equal to the entry's directory name.
pub const SLUG_KEY: &str = "slug";

/// One model's configuration as loaded from `<base_dir>/<slug>/config.json`.
/// The schema is opaque apart from the `slug` key.
pub type ModelEntry = Map<String, Value>;

/// Ordered list of model entries, published as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<ModelEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry after setting its `slug`, overwriting any value the
    /// source file carried.
    pub fn push_entry(&mut self, slug: &str, mut entry: ModelEntry) {
        entry.insert(SLUG_KEY.to_string(), Value::String(slug.to_string()));
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| e.get(SLUG_KEY).and_then(Value::as_str))
            .collect()
    }

    /// Orders entries by slug. Directory listing order is otherwise kept as-is.
    pub fn sort_by_slug(&mut self) {
        self.entries.sort_by(|a, b| {
            let a = a.get(SLUG_KEY).and_then(Value::as_str).unwrap_or_default();
            let b = b.get(SLUG_KEY).and_then(Value::as_str).unwrap_or_default();
            a.cmp(b)
        });
    }

    /// Serializes as a JSON array indented with 4 spaces.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Structural comparison against an arbitrary JSON document: same length,
    /// same order, same keys and values per entry. Key order inside an entry
    /// is not significant.
    pub fn matches(&self, other: &Value) -> bool {
        match other {
            Value::Array(items) => {
                items.len() == self.entries.len()
                    && items.iter().zip(&self.entries).all(|(item, entry)| {
                        item.as_object().is_some_and(|obj| obj == entry)
                    })
            }
            _ => false,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }

        let manifest_json = self
            .to_json_pretty()
            .context("Failed to serialize manifest to JSON")?;

        fs::write(path, manifest_json)
            .with_context(|| format!("Failed to write manifest to {}", path.display()))?;

        Ok(())
    }
}
