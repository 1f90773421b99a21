//! Reading prior manifests and persisting the current one atomically.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use super::{ManifestMode, RevManifest};
use crate::error::{BuildError, BuildResult};

fn manifest_error(path: &Path, reason: impl ToString) -> BuildError {
  BuildError::ManifestWrite {
    path: path.to_path_buf(),
    reason: reason.to_string(),
  }
}

/// Load a manifest from disk. An absent file is treated as an empty manifest.
pub fn load_manifest(path: &Path) -> BuildResult<RevManifest> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(RevManifest::new()),
    Err(err) => return Err(manifest_error(path, format!("cannot read prior manifest: {err}"))),
  };
  serde_json::from_str(&content)
    .map_err(|err| manifest_error(path, format!("cannot parse prior manifest: {err}")))
}

/// Persist `manifest` at `path`, combining it with the prior manifest when merging.
///
/// Returns the manifest as written. A prior manifest that cannot be parsed is left
/// untouched and reported rather than overwritten.
pub fn persist_manifest(
  path: &Path,
  manifest: &RevManifest,
  mode: ManifestMode,
) -> BuildResult<RevManifest> {
  let written = match mode {
    ManifestMode::Replace => manifest.clone(),
    ManifestMode::Merge => load_manifest(path)?.merged_with(manifest),
  };
  write_manifest(path, &written)?;
  tracing::info!(
    path = %path.display(),
    entries = written.len(),
    ?mode,
    "wrote revision manifest"
  );
  Ok(written)
}

/// Write the manifest through a temporary sibling file so readers never see a partial file.
pub fn write_manifest(path: &Path, manifest: &RevManifest) -> BuildResult<()> {
  let parent = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  fs::create_dir_all(parent).map_err(|err| manifest_error(path, err))?;

  let mut json = serde_json::to_string_pretty(manifest).map_err(|err| manifest_error(path, err))?;
  json.push('\n');

  let mut staged = NamedTempFile::new_in(parent).map_err(|err| manifest_error(path, err))?;
  staged
    .write_all(json.as_bytes())
    .map_err(|err| manifest_error(path, err))?;
  staged
    .persist(path)
    .map_err(|err| manifest_error(path, err.error))?;
  Ok(())
}
