//! Type-specific content transforms applied to bundles before fingerprinting.

use crate::config::Pipeline;
use crate::error::{BuildError, BuildResult};
use crate::minify::{MinifyError, minify_css, minify_js};
use crate::models::{AssetKind, Bundle};

/// Transform applied to one kind of bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
  /// Leave the content untouched.
  Skip,
  /// Minify the content.
  Minify,
}

impl Transform {
  /// Map a boolean feature flag onto a transform.
  pub fn from_flag(enabled: bool) -> Self {
    if enabled { Self::Minify } else { Self::Skip }
  }

  /// Rewrite the bundle content in place. The bundle path and kind are never touched.
  pub fn apply(self, bundle: &mut Bundle) -> BuildResult<()> {
    let minify: fn(&str) -> Result<String, MinifyError> = match (self, bundle.kind) {
      (Self::Skip, _) | (_, AssetKind::Remove) => return Ok(()),
      (Self::Minify, AssetKind::Script) => minify_js,
      (Self::Minify, AssetKind::Stylesheet) => minify_css,
    };

    let text = std::str::from_utf8(&bundle.content).map_err(|err| BuildError::Transform {
      output: bundle.original_path.clone(),
      line: line_of_byte(&bundle.content, err.valid_up_to()),
      reason: "bundle is not valid UTF-8".to_string(),
    })?;

    let minified = minify(text).map_err(|err| BuildError::Transform {
      output: bundle.original_path.clone(),
      line: err.line,
      reason: err.reason,
    })?;

    tracing::debug!(
      output = %bundle.original_path,
      before = bundle.content.len(),
      after = minified.len(),
      "minified bundle"
    );
    bundle.content = minified.into_bytes();
    Ok(())
  }
}

/// Run the transform configured for the bundle's kind.
pub fn transform_bundle(pipeline: &Pipeline, bundle: &mut Bundle) -> BuildResult<()> {
  let transform = match bundle.kind {
    AssetKind::Script => pipeline.scripts,
    AssetKind::Stylesheet => pipeline.styles,
    AssetKind::Remove => Transform::Skip,
  };
  transform.apply(bundle)
}

fn line_of_byte(content: &[u8], offset: usize) -> usize {
  content[..offset].iter().filter(|byte| **byte == b'\n').count() + 1
}
