//! Content-derived renaming of bundles for cache busting.

use sha2::{Digest, Sha256};

use crate::asset_paths::fingerprinted_path;
use crate::models::{Bundle, RevisionEntry};

/// Number of digest bytes kept in a fingerprint (128 bits).
pub const FINGERPRINT_BYTES: usize = 16;

/// Fingerprinting behaviour for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fingerprint {
  /// Keep declared paths and emit no revisions.
  Disabled,
  /// Insert a SHA-256 derived fingerprint before the extension.
  ContentHash,
}

impl Fingerprint {
  /// Rename the bundle according to its current content.
  ///
  /// Returns the revision recorded for the manifest, or `None` when fingerprinting is off.
  pub fn apply(self, bundle: &mut Bundle) -> Option<RevisionEntry> {
    match self {
      Self::Disabled => None,
      Self::ContentHash => {
        let hash = content_hash(&bundle.content);
        bundle.path = fingerprinted_path(&bundle.original_path, &hash);
        Some(RevisionEntry {
          original: bundle.original_path.clone(),
          revved: bundle.path.clone(),
        })
      }
    }
  }
}

/// Lowercase hex of the first [`FINGERPRINT_BYTES`] of the SHA-256 digest of `content`.
pub fn content_hash(content: &[u8]) -> String {
  let digest = Sha256::digest(content);
  digest[..FINGERPRINT_BYTES]
    .iter()
    .map(|byte| format!("{byte:02x}"))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::AssetKind;

  fn bundle(content: &[u8]) -> Bundle {
    Bundle::new(AssetKind::Script, "scripts/app.js".into(), content.to_vec())
  }

  #[test]
  fn hash_is_128_bits_of_hex() {
    let hash = content_hash(b"x();\ny();");
    assert_eq!(hash.len(), FINGERPRINT_BYTES * 2);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
  }

  #[test]
  fn same_content_yields_same_name() {
    let mut first = bundle(b"x();");
    let mut second = bundle(b"x();");
    Fingerprint::ContentHash.apply(&mut first);
    Fingerprint::ContentHash.apply(&mut second);
    assert_eq!(first.path, second.path);
  }

  #[test]
  fn one_byte_changes_the_name() {
    let mut first = bundle(b"x();");
    let mut second = bundle(b"y();");
    Fingerprint::ContentHash.apply(&mut first);
    Fingerprint::ContentHash.apply(&mut second);
    assert_ne!(first.path, second.path);
  }

  #[test]
  fn emits_revision_with_renamed_path() {
    let mut bundle = bundle(b"x();");
    let entry = Fingerprint::ContentHash.apply(&mut bundle).unwrap();
    let hash = content_hash(b"x();");
    assert_eq!(entry.original, "scripts/app.js");
    assert_eq!(entry.revved, format!("scripts/app.{hash}.js"));
    assert_eq!(bundle.path, entry.revved);
  }

  #[test]
  fn disabled_keeps_path_and_emits_nothing() {
    let mut bundle = bundle(b"x();");
    assert!(Fingerprint::Disabled.apply(&mut bundle).is_none());
    assert_eq!(bundle.path, "scripts/app.js");
  }
}
