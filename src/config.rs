//! Build configuration loader describing source layout, output paths and feature flags.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bundle::fingerprint::Fingerprint;
use crate::bundle::transform::Transform;
use crate::manifest::ManifestMode;

/// File name searched for by [`BuildConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "site-bundler.json";

/// Discoverable configuration for a build invocation.
///
/// Relative paths are resolved against the directory passed to the path helpers, normally
/// the working directory of the invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
  /// Minify script bundles.
  pub minify_scripts: bool,
  /// Minify stylesheet bundles.
  pub minify_styles: bool,
  /// Fingerprint bundle names and emit a revision manifest.
  pub cache_bust: bool,
  /// Merge new revisions into an existing manifest instead of replacing it.
  pub manifest_merge: bool,
  /// Directory receiving bundles and the manifest.
  pub output_dir: String,
  /// Root used to resolve asset references.
  pub search_root: String,
  /// Extensions of output files that receive the global revision rewrite.
  pub replace_in_file_types: BTreeSet<String>,
  /// Directory containing markup sources.
  pub markup_root: String,
  /// Glob, relative to the markup root, selecting markup sources.
  pub markup_glob: String,
  /// Directory receiving rewritten markup.
  pub markup_output_dir: String,
  /// Manifest file name within the output directory.
  pub manifest_file: String,
  /// Template data merge settings.
  pub data: DataConfig,
}

/// Settings for merging JSON template data fragments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataConfig {
  /// Directory containing the fragments.
  pub root: String,
  /// Glob, relative to the root, selecting fragments.
  pub glob: String,
  /// File receiving the merged object.
  pub output: String,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      minify_scripts: true,
      minify_styles: true,
      cache_bust: true,
      manifest_merge: true,
      output_dir: "dist".into(),
      search_root: "app".into(),
      replace_in_file_types: [".jade", ".html", ".css", ".js"]
        .into_iter()
        .map(String::from)
        .collect(),
      markup_root: "app/views".into(),
      markup_glob: "**/*.{jade,pug,html}".into(),
      markup_output_dir: ".tmp/jade".into(),
      manifest_file: "rev-manifest.json".into(),
      data: DataConfig::default(),
    }
  }
}

impl Default for DataConfig {
  fn default() -> Self {
    Self {
      root: "app/views/data".into(),
      glob: "**/*.json".into(),
      output: "app/views/data.json".into(),
    }
  }
}

impl BuildConfig {
  /// Load `site-bundler.json` from the provided directory.
  ///
  /// A missing file yields the defaults; a file that exists but fails to parse is an error
  /// so that a typo never silently turns cache busting off.
  pub fn discover(base_dir: &Path) -> Result<Self> {
    let candidate = base_dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.exists() {
      return Ok(Self::default());
    }
    Self::from_path(&candidate)
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse config {}", path.display()))
  }

  /// Translate the feature flags into explicit stage variants.
  pub fn pipeline(&self) -> Pipeline {
    Pipeline {
      scripts: Transform::from_flag(self.minify_scripts),
      styles: Transform::from_flag(self.minify_styles),
      fingerprint: if self.cache_bust {
        Fingerprint::ContentHash
      } else {
        Fingerprint::Disabled
      },
      manifest: if self.manifest_merge {
        ManifestMode::Merge
      } else {
        ManifestMode::Replace
      },
    }
  }

  /// Whether files with the given path receive the global revision rewrite.
  pub fn replaces_in(&self, path: &Path) -> bool {
    let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
      return false;
    };
    self
      .replace_in_file_types
      .iter()
      .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(extension))
  }
}

impl BuildConfig {
  /// Absolute output directory.
  pub fn output_dir_path(&self, base_dir: &Path) -> PathBuf {
    base_dir.join(&self.output_dir)
  }

  /// Absolute search root.
  pub fn search_root_path(&self, base_dir: &Path) -> PathBuf {
    base_dir.join(&self.search_root)
  }

  /// Absolute markup source directory.
  pub fn markup_root_path(&self, base_dir: &Path) -> PathBuf {
    base_dir.join(&self.markup_root)
  }

  /// Absolute rewritten markup directory.
  pub fn markup_output_path(&self, base_dir: &Path) -> PathBuf {
    base_dir.join(&self.markup_output_dir)
  }

  /// Absolute manifest location.
  pub fn manifest_path(&self, base_dir: &Path) -> PathBuf {
    self.output_dir_path(base_dir).join(&self.manifest_file)
  }
}

/// Stage variants selected from the configuration flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipeline {
  /// Transform applied to script bundles.
  pub scripts: Transform,
  /// Transform applied to stylesheet bundles.
  pub styles: Transform,
  /// Fingerprinting behaviour.
  pub fingerprint: Fingerprint,
  /// Manifest persistence behaviour.
  pub manifest: ManifestMode,
}
