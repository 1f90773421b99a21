//! Conservative, idempotent minifiers for bundled scripts and stylesheets.
//!
//! Both minifiers strip comments and collapse whitespace while leaving string, template and
//! regular expression literals untouched. They track bracket nesting as they go, which lets
//! them reject content that is syntactically broken instead of emitting a silently wrong
//! bundle.

mod css;
mod js;

use std::fmt;

pub use css::minify_css;
pub use js::minify_js;

/// Syntax problem detected while minifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifyError {
  /// 1-based line of the problem in the input.
  pub line: usize,
  /// Human readable description.
  pub reason: String,
}

impl MinifyError {
  pub(crate) fn new(line: usize, reason: impl Into<String>) -> Self {
    Self {
      line,
      reason: reason.into(),
    }
  }
}

impl fmt::Display for MinifyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "line {}: {}", self.line, self.reason)
  }
}

impl std::error::Error for MinifyError {}

fn closing_for(open: char) -> char {
  match open {
    '(' => ')',
    '[' => ']',
    _ => '}',
  }
}
