//! Replace build blocks with bundle references and propagate revisions across outputs.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::asset_paths::normalize_bundle_path;
use crate::models::{AssetKind, RevisionMap, SourceSpan};
use crate::scan::MarkupSyntax;

/// Replacement for a single block span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanReplacement {
  /// Span being replaced.
  pub span: SourceSpan,
  /// Kind of the block, selecting the reference element.
  pub kind: AssetKind,
  /// Path the new reference points at.
  pub href: String,
}

/// Replace each block span with a single reference element.
///
/// Replacements must be sorted by span start and must not overlap, which holds for blocks
/// returned by the scanner. A block that renders to nothing and sits on lines of its own
/// takes those lines with it.
pub fn rewrite_spans(syntax: MarkupSyntax, text: &str, replacements: &[SpanReplacement]) -> String {
  let mut out = String::with_capacity(text.len());
  let mut cursor = 0;
  for replacement in replacements {
    let rendered = syntax.render_reference(replacement.kind, &replacement.href);
    let SourceSpan { mut start, mut end } = replacement.span;
    if rendered.is_empty() {
      let (line_start, line_end) = whole_lines(text, start, end);
      if line_start >= cursor {
        (start, end) = (line_start, line_end);
      }
    }
    out.push_str(&text[cursor..start]);
    out.push_str(&rendered);
    cursor = end;
  }
  out.push_str(&text[cursor..]);
  out
}

/// Widen a span to its full lines when only horizontal whitespace surrounds it.
fn whole_lines(text: &str, start: usize, end: usize) -> (usize, usize) {
  let line_start = text[..start].trim_end_matches([' ', '\t']).len();
  if line_start != 0 && !text[..line_start].ends_with('\n') {
    return (start, end);
  }
  let rest = &text[end..];
  let trailing = rest.len() - rest.trim_start_matches([' ', '\t']).len();
  let after = &rest[trailing..];
  if after.starts_with("\r\n") {
    (line_start, end + trailing + 2)
  } else if after.starts_with('\n') {
    (line_start, end + trailing + 1)
  } else if after.is_empty() {
    (line_start, text.len())
  } else {
    (start, end)
  }
}

/// Reference path for a bundle, keeping the leading `/` or `./` of the declared path.
pub fn reference_href(declared: &str, bundle_path: &str) -> String {
  let declared = declared.trim();
  let normalized = normalize_bundle_path(declared);
  let prefix = declared
    .strip_suffix(normalized.as_str())
    .unwrap_or_default();
  format!("{prefix}{bundle_path}")
}

/// Rewrites every occurrence of a revisioned path with its fingerprinted counterpart.
#[derive(Debug, Clone)]
pub struct RevisionRewriter<'a> {
  revisions: &'a RevisionMap,
  /// Keys grouped by first byte, longest first within each group.
  keys: BTreeMap<u8, Vec<&'a str>>,
}

impl<'a> RevisionRewriter<'a> {
  /// Build a rewriter over the given revisions.
  pub fn new(revisions: &'a RevisionMap) -> Self {
    let mut keys: BTreeMap<u8, Vec<&'a str>> = BTreeMap::new();
    for key in revisions.keys() {
      if let Some(&first) = key.as_bytes().first() {
        keys.entry(first).or_default().push(key.as_str());
      }
    }
    for group in keys.values_mut() {
      group.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    }
    Self { revisions, keys }
  }

  /// Replace revisioned paths in `text` in a single left-to-right pass.
  ///
  /// A match only counts when it is not embedded in a longer file name, so `app.js` does not
  /// rewrite `myapp.js` or `app.js.map`. The longest key that qualifies at a position wins.
  pub fn rewrite<'t>(&self, text: &'t str) -> Cow<'t, str> {
    match self.rewrite_bytes(text.as_bytes()) {
      Cow::Borrowed(_) => Cow::Borrowed(text),
      // Keys and values are whole strings spliced at character boundaries.
      Cow::Owned(bytes) => Cow::Owned(
        String::from_utf8(bytes)
          .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned()),
      ),
    }
  }

  /// Byte-level variant of [`rewrite`](Self::rewrite) for content that need not be UTF-8.
  pub fn rewrite_bytes<'t>(&self, text: &'t [u8]) -> Cow<'t, [u8]> {
    let mut out = Vec::new();
    let mut cursor = 0;
    let mut pos = 0;
    while pos < text.len() {
      match self.match_at(text, pos) {
        Some((len, revved)) => {
          out.extend_from_slice(&text[cursor..pos]);
          out.extend_from_slice(revved.as_bytes());
          pos += len;
          cursor = pos;
        }
        None => pos += 1,
      }
    }

    if cursor == 0 {
      return Cow::Borrowed(text);
    }
    out.extend_from_slice(&text[cursor..]);
    Cow::Owned(out)
  }

  fn match_at(&self, text: &[u8], pos: usize) -> Option<(usize, &'a str)> {
    let group = self.keys.get(&text[pos])?;
    if !boundary_before(text, pos) {
      return None;
    }
    let key = group.iter().find(|key| {
      text[pos..].starts_with(key.as_bytes()) && boundary_after(text, pos + key.len())
    })?;
    let revved = self.revisions.get(*key)?;
    Some((key.len(), revved.as_str()))
  }
}

fn is_name_byte(b: u8) -> bool {
  b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || !b.is_ascii()
}

fn boundary_before(text: &[u8], start: usize) -> bool {
  match start.checked_sub(1).map(|prev| text[prev]) {
    None => true,
    Some(b) => !is_name_byte(b) && b != b'.',
  }
}

fn boundary_after(text: &[u8], end: usize) -> bool {
  match text.get(end) {
    None => true,
    Some(b'.') => !text
      .get(end + 1)
      .is_some_and(|b| b.is_ascii_alphanumeric() || !b.is_ascii()),
    Some(&b) => !is_name_byte(b),
  }
}
