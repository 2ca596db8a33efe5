use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{PublisherError, Result};
use crate::manifest::Manifest;

/// File expected inside each model directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Walks the immediate children of `base_dir` and loads every
/// `<child>/config.json` into a manifest entry, in directory listing order.
///
/// Children without a config file are skipped. A config file that is not a
/// JSON object aborts the whole build.
pub fn build_manifest(base_dir: impl AsRef<Path>) -> Result<Manifest> {
    let base_dir = base_dir.as_ref();
    let fs_error = |source| PublisherError::FileSystem {
        path: base_dir.to_path_buf(),
        source,
    };

    let mut manifest = Manifest::new();

    for dir_entry in fs::read_dir(base_dir).map_err(fs_error)? {
        let dir_entry = dir_entry.map_err(fs_error)?;
        let slug = dir_entry.file_name().to_string_lossy().into_owned();
        let config_path = dir_entry.path().join(CONFIG_FILE_NAME);

        if !config_path.is_file() {
            debug!(slug = %slug, "No {} found, skipping", CONFIG_FILE_NAME);
            continue;
        }

        let config = load_config(&config_path)?;
        debug!(slug = %slug, path = %config_path.display(), "Loaded model config");
        manifest.push_entry(&slug, config);
    }

    info!(
        base_dir = %base_dir.display(),
        entries = manifest.len(),
        "Built manifest"
    );

    Ok(manifest)
}

fn load_config(path: &Path) -> Result<serde_json::Map<String, Value>> {
    let content = fs::read(path).map_err(|source| PublisherError::FileSystem {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value = serde_json::from_slice(&content).map_err(|e| PublisherError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(PublisherError::ConfigParse {
            path: path.to_path_buf(),
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
