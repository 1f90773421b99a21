//! Merging of JSON template data fragments into a single document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::config::DataConfig;
use crate::scan::discover_files;

/// Merged data together with the fragments it was built from.
#[derive(Debug, Clone)]
pub struct MergedData {
  /// Deep-merged object.
  pub value: Value,
  /// Fragment paths relative to the data root, in merge order.
  pub fragments: Vec<PathBuf>,
}

/// Recursively merge `overlay` into `base`.
///
/// Objects are merged key by key; any other value in `overlay`, arrays included, replaces
/// what `base` held.
pub fn deep_merge(base: &mut Value, overlay: Value) {
  match (base, overlay) {
    (Value::Object(base), Value::Object(overlay)) => {
      for (key, value) in overlay {
        match base.get_mut(&key) {
          Some(existing) => deep_merge(existing, value),
          None => {
            base.insert(key, value);
          }
        }
      }
    }
    (base, overlay) => *base = overlay,
  }
}

/// Read every fragment under `root` matching `pattern` in sorted order and merge them.
pub fn merge_fragments(root: &Path, pattern: &str) -> Result<MergedData> {
  let fragments = discover_files(root, pattern)?;
  let mut value = Value::Object(Map::new());

  for relative in &fragments {
    let path = root.join(relative);
    let content = fs::read_to_string(&path)
      .with_context(|| format!("failed to read data fragment {}", path.display()))?;
    let fragment: Value = serde_json::from_str(&content)
      .with_context(|| format!("failed to parse data fragment {}", path.display()))?;
    if !fragment.is_object() {
      bail!("data fragment {} is not a JSON object", path.display());
    }
    tracing::debug!(fragment = %relative.display(), "merging data fragment");
    deep_merge(&mut value, fragment);
  }

  Ok(MergedData { value, fragments })
}

/// Merge the configured fragments and write the result, returning what was merged.
pub fn write_merged_data(config: &DataConfig, base_dir: &Path) -> Result<MergedData> {
  let root = base_dir.join(&config.root);
  let output = base_dir.join(&config.output);
  let merged = merge_fragments(&root, &config.glob)?;

  if let Some(parent) = output.parent() {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let mut json = serde_json::to_string_pretty(&merged.value)?;
  json.push('\n');
  fs::write(&output, json).with_context(|| format!("failed to write {}", output.display()))?;

  tracing::info!(
    output = %output.display(),
    fragments = merged.fragments.len(),
    "merged template data"
  );
  Ok(merged)
}
