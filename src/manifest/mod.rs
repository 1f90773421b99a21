//! Revision manifest accumulated across a build and persisted once at its end.

mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{RevisionEntry, RevisionMap};

pub use store::{load_manifest, persist_manifest, write_manifest};

/// How the manifest of this run relates to one already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestMode {
  /// Overwrite any prior manifest with this run's entries.
  Replace,
  /// Keep prior entries, letting this run's entries win on collision.
  Merge,
}

/// Mapping from declared bundle paths to fingerprinted paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevManifest {
  entries: BTreeMap<String, String>,
}

impl RevManifest {
  /// Empty manifest.
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a revision, returning the fingerprinted path it replaced if the key was known.
  pub fn record(&mut self, entry: RevisionEntry) -> Option<String> {
    self.entries.insert(entry.original, entry.revved)
  }

  /// Look up the fingerprinted path for a declared path.
  pub fn get(&self, original: &str) -> Option<&str> {
    self.entries.get(original).map(String::as_str)
  }

  /// All entries keyed by declared path.
  pub fn entries(&self) -> &RevisionMap {
    &self.entries
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether the manifest holds no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Layer `newer` on top of `self`: unrelated entries survive, colliding keys take the
  /// newer value.
  pub fn merged_with(mut self, newer: &RevManifest) -> Self {
    for (original, revved) in &newer.entries {
      self.entries.insert(original.clone(), revved.clone());
    }
    self
  }
}

impl FromIterator<RevisionEntry> for RevManifest {
  fn from_iter<I: IntoIterator<Item = RevisionEntry>>(iter: I) -> Self {
    let mut manifest = Self::new();
    for entry in iter {
      manifest.record(entry);
    }
    manifest
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(original: &str, revved: &str) -> RevisionEntry {
    RevisionEntry {
      original: original.into(),
      revved: revved.into(),
    }
  }

  fn manifest(entries: &[(&str, &str)]) -> RevManifest {
    entries.iter().map(|(a, b)| entry(a, b)).collect()
  }

  #[test]
  fn merge_keeps_unrelated_entries() {
    let prior = manifest(&[("old.js", "old.1.js"), ("app.js", "app.1.js")]);
    let current = manifest(&[("app.js", "app.2.js")]);
    let merged = prior.merged_with(&current);

    assert_eq!(merged.get("old.js"), Some("old.1.js"));
    assert_eq!(merged.get("app.js"), Some("app.2.js"));
    assert_eq!(merged.len(), 2);
  }

  #[test]
  fn disjoint_merges_commute() {
    let base = manifest(&[("base.css", "base.0.css")]);
    let a = manifest(&[("a.js", "a.1.js"), ("a.css", "a.1.css")]);
    let b = manifest(&[("b.js", "b.1.js")]);

    let ab = base.clone().merged_with(&a).merged_with(&b);
    let ba = base.merged_with(&b).merged_with(&a);
    assert_eq!(ab, ba);
  }

  #[test]
  fn most_recent_run_wins_on_collision() {
    let a = manifest(&[("app.js", "app.1.js")]);
    let b = manifest(&[("app.js", "app.2.js")]);
    let merged = RevManifest::new().merged_with(&a).merged_with(&b);
    assert_eq!(merged.get("app.js"), Some("app.2.js"));
  }

  #[test]
  fn record_reports_replaced_value() {
    let mut manifest = RevManifest::new();
    assert_eq!(manifest.record(entry("app.js", "app.1.js")), None);
    assert_eq!(
      manifest.record(entry("app.js", "app.2.js")),
      Some("app.1.js".to_string())
    );
  }

  #[test]
  fn serializes_as_flat_object() {
    let manifest = manifest(&[("b.js", "b.1.js"), ("a.js", "a.1.js")]);
    assert_eq!(
      serde_json::to_string(&manifest).unwrap(),
      r#"{"a.js":"a.1.js","b.js":"b.1.js"}"#
    );
  }
}
