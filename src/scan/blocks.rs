//! Locate build blocks and the references they enclose.

use std::path::Path;

use regex::{Captures, Match};

use crate::asset_paths::should_ignore_asset_reference;
use crate::error::{BuildError, BuildResult};
use crate::models::{AssetKind, AssetReference, BuildBlock, SourceSpan};
use crate::scan::MarkupSyntax;

enum Tag<'t> {
  Start(Captures<'t>),
  End,
}

struct TagMatch<'t> {
  start: usize,
  end: usize,
  tag: Tag<'t>,
}

struct OpenBlock {
  kind: AssetKind,
  output_path: String,
  search_roots: Vec<String>,
  start: usize,
  content_start: usize,
  line: usize,
}

/// Scan markup for build blocks, returning them in source order.
///
/// Any structural problem makes the whole file unusable, so the first one found is
/// returned as [`BuildError::MalformedBlock`].
pub fn scan_blocks(file: &Path, syntax: MarkupSyntax, text: &str) -> BuildResult<Vec<BuildBlock>> {
  let malformed = |offset: usize, reason: String| BuildError::MalformedBlock {
    file: file.to_path_buf(),
    line: line_of(text, offset),
    reason,
  };

  let mut tags: Vec<TagMatch<'_>> = syntax
    .start_pattern()
    .captures_iter(text)
    .filter_map(|caps| {
      let whole = caps.get(0)?;
      Some(TagMatch {
        start: whole.start(),
        end: tag_end(whole),
        tag: Tag::Start(caps),
      })
    })
    .chain(syntax.end_pattern().find_iter(text).map(|found| TagMatch {
      start: found.start(),
      end: tag_end(found),
      tag: Tag::End,
    }))
    .collect();
  tags.sort_by_key(|tag| tag.start);

  let mut blocks = Vec::new();
  let mut open: Option<OpenBlock> = None;

  for tag in tags {
    match tag.tag {
      Tag::Start(caps) => {
        if let Some(current) = &open {
          return Err(malformed(
            tag.start,
            format!(
              "build:{} opened before the block at line {} was closed",
              &caps[1], current.line
            ),
          ));
        }
        let block = open_block(&caps, tag.start, tag.end, text)
          .map_err(|reason| malformed(tag.start, reason))?;
        open = Some(block);
      }
      Tag::End => {
        let Some(current) = open.take() else {
          return Err(malformed(
            tag.start,
            "endbuild without a matching build tag".to_string(),
          ));
        };
        let content = &text[current.content_start..tag.start];
        let assets = collect_references(syntax, current.kind, content)
          .map_err(|reason| malformed(current.start, reason))?;
        blocks.push(BuildBlock {
          kind: current.kind,
          output_path: current.output_path,
          search_roots: current.search_roots,
          assets,
          span: SourceSpan {
            start: current.start,
            end: tag.end,
          },
          line: current.line,
        });
      }
    }
  }

  if let Some(current) = open {
    return Err(malformed(
      current.start,
      format!(
        "build:{} {} has no matching endbuild",
        current.kind, current.output_path
      ),
    ));
  }

  Ok(blocks)
}

fn open_block(
  caps: &Captures<'_>,
  start: usize,
  end: usize,
  text: &str,
) -> Result<OpenBlock, String> {
  let kind =
    AssetKind::from_tag(&caps[1]).ok_or_else(|| format!("unknown block type `{}`", &caps[1]))?;
  let output_path = caps
    .get(3)
    .map(|m| m.as_str().to_string())
    .unwrap_or_default();
  if output_path.is_empty() && kind != AssetKind::Remove {
    return Err(format!("build:{kind} is missing an output path"));
  }
  if escapes_output_dir(&output_path) {
    return Err(format!(
      "output path `{output_path}` escapes the output directory"
    ));
  }

  let search_roots = caps
    .get(2)
    .map(|m| {
      m.as_str()
        .trim_matches(|c| c == '{' || c == '}')
        .split(',')
        .map(str::trim)
        .filter(|root| !root.is_empty())
        .map(String::from)
        .collect()
    })
    .unwrap_or_default();

  Ok(OpenBlock {
    kind,
    output_path,
    search_roots,
    start,
    content_start: end,
    line: line_of(text, start),
  })
}

fn collect_references(
  syntax: MarkupSyntax,
  kind: AssetKind,
  content: &str,
) -> Result<Vec<AssetReference>, String> {
  if kind == AssetKind::Remove {
    return Ok(Vec::new());
  }

  let mut assets = Vec::new();
  for caps in syntax.reference_pattern().captures_iter(content) {
    let path = caps[1].trim();
    if should_ignore_asset_reference(path) {
      tracing::debug!(reference = path, "skipping external reference");
      continue;
    }
    if let Some(observed) = AssetKind::from_extension(path)
      && observed != kind
    {
      return Err(format!(
        "build:{kind} block references {observed} asset `{path}`"
      ));
    }
    assets.push(AssetReference {
      path: path.to_string(),
      kind,
    });
  }
  Ok(assets)
}

/// End offset of a tag match, leaving a trailing `\r` of a CRLF line ending in place.
fn tag_end(found: Match<'_>) -> usize {
  found.end() - usize::from(found.as_str().ends_with('\r'))
}

/// Whether a declared bundle path would land outside the output directory.
fn escapes_output_dir(output_path: &str) -> bool {
  let path = output_path.trim();
  let has_drive = path.as_bytes().get(1) == Some(&b':');
  has_drive || path.split(['/', '\\']).any(|segment| segment == "..")
}

fn line_of(text: &str, offset: usize) -> usize {
  text[..offset].matches('\n').count() + 1
}
