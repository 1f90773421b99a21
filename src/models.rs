//! Data structures produced while scanning markup and assembling bundles.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Kind of asset a build block declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
  /// JavaScript bundles referenced through `<script>` tags.
  Script,
  /// CSS bundles referenced through `<link rel="stylesheet">` tags.
  Stylesheet,
  /// Blocks whose content is dropped from the output without producing a bundle.
  Remove,
}

impl AssetKind {
  /// Parse the type token that follows `build:` in a start tag.
  pub fn from_tag(token: &str) -> Option<Self> {
    match token.to_ascii_lowercase().as_str() {
      "js" => Some(Self::Script),
      "css" => Some(Self::Stylesheet),
      "remove" => Some(Self::Remove),
      _ => None,
    }
  }

  /// Classify a reference by its file extension, ignoring query strings and fragments.
  pub fn from_extension(path: &str) -> Option<Self> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (_, extension) = file_name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
      "js" | "mjs" | "cjs" => Some(Self::Script),
      "css" => Some(Self::Stylesheet),
      _ => None,
    }
  }
}

impl fmt::Display for AssetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Script => f.write_str("js"),
      Self::Stylesheet => f.write_str("css"),
      Self::Remove => f.write_str("remove"),
    }
  }
}

/// Byte range of a build block within its markup source, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
  /// Offset of the first byte of the start tag.
  pub start: usize,
  /// Offset just past the end tag.
  pub end: usize,
}

/// A single asset referenced inside a build block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
  /// Path exactly as written in the markup.
  pub path: String,
  /// Kind inherited from the enclosing block.
  pub kind: AssetKind,
}

/// One start/end tag pair discovered in a markup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildBlock {
  /// Declared block kind.
  pub kind: AssetKind,
  /// Declared output path of the bundle, empty for `remove` blocks.
  pub output_path: String,
  /// Alternate search roots listed in parentheses after the type.
  pub search_roots: Vec<String>,
  /// References in declaration order.
  pub assets: Vec<AssetReference>,
  /// Span of the block, start tag through end tag.
  pub span: SourceSpan,
  /// 1-based line of the start tag.
  pub line: usize,
}

/// Concatenated content for a single block as it moves through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
  /// Kind the bundle was declared with.
  pub kind: AssetKind,
  /// Declared path, normalised to forward slashes without a leading slash.
  pub original_path: String,
  /// Current path, rewritten once fingerprinting runs.
  pub path: String,
  /// Bundle bytes.
  pub content: Vec<u8>,
}

impl Bundle {
  /// Create a bundle whose current path equals the declared path.
  pub fn new(kind: AssetKind, original_path: String, content: Vec<u8>) -> Self {
    Self {
      kind,
      path: original_path.clone(),
      original_path,
      content,
    }
  }
}

/// Mapping from a bundle's declared path to its fingerprinted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionEntry {
  /// Path before fingerprinting.
  pub original: String,
  /// Path after fingerprinting.
  pub revved: String,
}

/// Rewritten markup waiting to be written to disk.
#[derive(Debug, Clone)]
pub struct RenderedMarkup {
  /// Path of the markup source relative to the markup root.
  pub relative_path: PathBuf,
  /// Markup with build blocks replaced by bundle references.
  pub text: String,
}

/// Outcome of the first pipeline phase for one markup file.
#[derive(Debug, Clone)]
pub struct ProcessedMarkup {
  /// Markup after span rewriting.
  pub markup: RenderedMarkup,
  /// Bundles produced by the file's blocks, in block order.
  pub bundles: Vec<Bundle>,
  /// Revision entries emitted while fingerprinting the file's bundles.
  pub revisions: Vec<RevisionEntry>,
  /// Every file read to produce the output, the markup source included.
  pub sources: Vec<PathBuf>,
}

/// Revision entries keyed by declared path.
pub type RevisionMap = BTreeMap<String, String>;
