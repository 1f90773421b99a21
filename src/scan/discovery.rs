//! Glob-driven discovery of markup sources and data fragments.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{BuildError, BuildResult};

/// Collect files under `root` whose root-relative path matches `pattern`.
///
/// Paths are returned relative to `root` and sorted lexicographically so that builds are
/// reproducible regardless of the order the platform reports directory entries in. A root
/// that does not exist yields no files.
pub fn discover_files(root: &Path, pattern: &str) -> BuildResult<Vec<PathBuf>> {
  let glob = Glob::new(pattern).map_err(|err| BuildError::InvalidGlob {
    pattern: pattern.to_string(),
    reason: err.to_string(),
  })?;

  if !root.is_dir() {
    return Ok(Vec::new());
  }

  let mut matches = Vec::new();
  for entry in WalkDir::new(root).follow_links(true) {
    let entry = entry.map_err(|err| {
      let path = err.path().unwrap_or(root).to_path_buf();
      BuildError::io(path, std::io::Error::other(err.to_string()))
    })?;
    if !entry.file_type().is_file() {
      continue;
    }

    let Ok(relative) = entry.path().strip_prefix(root) else {
      continue;
    };
    let normalized = relative.to_string_lossy().replace('\\', "/");
    if glob.matched(&CandidatePath::from(normalized.as_str())).is_some() {
      matches.push(relative.to_path_buf());
    }
  }

  matches.sort();
  Ok(matches)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn returns_sorted_relative_matches() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("layouts")).unwrap();
    fs::write(root.join("zeta.jade"), "p").unwrap();
    fs::write(root.join("alpha.html"), "<p>").unwrap();
    fs::write(root.join("layouts/base.jade"), "html").unwrap();
    fs::write(root.join("notes.txt"), "skip").unwrap();

    let files = discover_files(root, "**/*.{jade,html}").unwrap();
    assert_eq!(files, vec![
      PathBuf::from("alpha.html"),
      PathBuf::from("layouts/base.jade"),
      PathBuf::from("zeta.jade"),
    ]);
  }

  #[test]
  fn missing_root_yields_nothing() {
    let dir = tempdir().unwrap();
    let files = discover_files(&dir.path().join("absent"), "**/*.html").unwrap();
    assert!(files.is_empty());
  }

  #[test]
  fn reports_invalid_globs() {
    let dir = tempdir().unwrap();
    let err = discover_files(dir.path(), "**/{a").unwrap_err();
    assert!(matches!(err, BuildError::InvalidGlob { .. }));
  }
}
