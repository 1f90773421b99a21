//! Concatenate the assets referenced by a build block into a single bundle.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::asset_paths::{ResolveContext, generate_asset_candidates, normalize_bundle_path};
use crate::error::{BuildError, BuildResult};
use crate::models::{BuildBlock, Bundle};

/// Separator placed between concatenated files.
pub const SEPARATOR: u8 = b'\n';

/// Bundle produced for a block along with the files it was built from.
#[derive(Debug, Clone)]
pub struct ConcatOutcome {
  /// Bundle content in declaration order.
  pub bundle: Bundle,
  /// Resolved files that were read, in declaration order.
  pub sources: Vec<PathBuf>,
  /// References that could not be resolved.
  pub missing: Vec<String>,
}

/// Read every reference of `block` and join them with a single newline.
///
/// References that resolve nowhere are collected in [`ConcatOutcome::missing`] and left
/// out of the bundle; any other read failure is returned as an error.
pub fn concat_block(context: &ResolveContext<'_>, block: &BuildBlock) -> BuildResult<ConcatOutcome> {
  let mut content = Vec::new();
  let mut sources = Vec::new();
  let mut missing = Vec::new();

  for asset in &block.assets {
    let candidates = generate_asset_candidates(context, &block.search_roots, &asset.path);
    let Some(found) = candidates.into_iter().find(|candidate| candidate.is_file()) else {
      missing.push(asset.path.clone());
      continue;
    };

    let bytes = match fs::read(&found) {
      Ok(bytes) => bytes,
      Err(err) if err.kind() == ErrorKind::NotFound => {
        missing.push(asset.path.clone());
        continue;
      }
      Err(err) => return Err(BuildError::io(found, err)),
    };

    if !sources.is_empty() {
      content.push(SEPARATOR);
    }
    content.extend_from_slice(&bytes);
    sources.push(found);
  }

  tracing::debug!(
    output = %block.output_path,
    files = sources.len(),
    missing = missing.len(),
    "concatenated block"
  );

  Ok(ConcatOutcome {
    bundle: Bundle::new(
      block.kind,
      normalize_bundle_path(&block.output_path),
      content,
    ),
    sources,
    missing,
  })
}
