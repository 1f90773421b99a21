//! Markup dialects understood by the scanner and the span rewriter.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::AssetKind;

/// Comment and reference syntax of a markup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupSyntax {
  /// `<!-- build:js app.js -->` blocks around `<script>`/`<link>` elements.
  Html,
  /// `// build:js app.js` line comments around `script(...)`/`link(...)` lines.
  Jade,
}

struct Patterns {
  start: Regex,
  end: Regex,
  reference: Regex,
}

fn html_patterns() -> &'static Patterns {
  static PATTERNS: OnceLock<Patterns> = OnceLock::new();
  PATTERNS.get_or_init(|| Patterns {
    start: Regex::new(r"<!--\s*build:(\w+)(?:\(([^)]*)\))?(?:\s+([^\s>]+?))?\s*-->")
      .expect("invalid html start regex"),
    end: Regex::new(r"<!--\s*endbuild\s*-->").expect("invalid html end regex"),
    reference: Regex::new(
      r#"(?i)<(?:script|link)\b[^>]*?\b(?:src|href)\s*=\s*["']([^"']+)["']"#,
    )
    .expect("invalid html reference regex"),
  })
}

fn jade_patterns() -> &'static Patterns {
  static PATTERNS: OnceLock<Patterns> = OnceLock::new();
  PATTERNS.get_or_init(|| Patterns {
    start: Regex::new(r"(?m)//-?[ \t]*build:(\w+)(?:\(([^)]*)\))?(?:[ \t]+(\S+))?[ \t]*\r?$")
      .expect("invalid jade start regex"),
    end: Regex::new(r"(?m)//-?[ \t]*endbuild[ \t]*\r?$").expect("invalid jade end regex"),
    reference: Regex::new(
      r#"(?im)^[ \t]*(?:script|link)\([^)]*?\b(?:src|href)\s*=\s*["']([^"']+)["']"#,
    )
    .expect("invalid jade reference regex"),
  })
}

impl MarkupSyntax {
  /// Pick the dialect from a file extension; anything that is not Jade is treated as HTML.
  pub fn for_path(path: &Path) -> Self {
    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("jade") || ext.eq_ignore_ascii_case("pug") => {
        Self::Jade
      }
      _ => Self::Html,
    }
  }

  fn patterns(self) -> &'static Patterns {
    match self {
      Self::Html => html_patterns(),
      Self::Jade => jade_patterns(),
    }
  }

  /// Pattern matching a start tag: captures the type, the alternate roots and the output path.
  pub(crate) fn start_pattern(self) -> &'static Regex {
    &self.patterns().start
  }

  /// Pattern matching an end tag.
  pub(crate) fn end_pattern(self) -> &'static Regex {
    &self.patterns().end
  }

  /// Pattern matching a script or stylesheet reference, capturing its path.
  pub(crate) fn reference_pattern(self) -> &'static Regex {
    &self.patterns().reference
  }

  /// Render the single element that replaces a block.
  pub fn render_reference(self, kind: AssetKind, path: &str) -> String {
    match (self, kind) {
      (_, AssetKind::Remove) => String::new(),
      (Self::Html, AssetKind::Script) => format!("<script src=\"{path}\"></script>"),
      (Self::Html, AssetKind::Stylesheet) => format!("<link rel=\"stylesheet\" href=\"{path}\">"),
      (Self::Jade, AssetKind::Script) => format!("script(src='{path}')"),
      (Self::Jade, AssetKind::Stylesheet) => format!("link(rel='stylesheet', href='{path}')"),
    }
  }
}
