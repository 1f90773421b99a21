//! Stylesheet minification.

use super::{MinifyError, closing_for};

/// Characters after which whitespace is never significant.
const TRIM_AFTER: &str = "{};,:>(";
/// Characters before which whitespace is never significant.
const TRIM_BEFORE: &str = "{};,>)";

/// Strip comments and redundant whitespace from CSS.
///
/// Whitespace before `(` and around `+`/`-` is preserved because `and (` in media queries
/// and operators inside `calc()` depend on it.
pub fn minify_css(source: &str) -> Result<String, MinifyError> {
  let chars: Vec<char> = source.chars().collect();
  let mut out = String::with_capacity(source.len());
  let mut stack: Vec<(char, usize)> = Vec::new();
  let mut pending_space = false;
  let mut line = 1;
  let mut pos = 0;

  while pos < chars.len() {
    let c = chars[pos];
    match c {
      '/' if chars.get(pos + 1) == Some(&'*') => {
        let start_line = line;
        pos += 2;
        loop {
          match chars.get(pos) {
            None => return Err(MinifyError::new(start_line, "unterminated comment")),
            Some('*') if chars.get(pos + 1) == Some(&'/') => {
              pos += 2;
              break;
            }
            Some(&ch) => {
              if ch == '\n' {
                line += 1;
              }
              pos += 1;
            }
          }
        }
        pending_space = true;
      }
      c if c.is_whitespace() => {
        if c == '\n' {
          line += 1;
        }
        pending_space = true;
        pos += 1;
      }
      '"' | '\'' => {
        flush_space(&mut out, &mut pending_space, c);
        let start_line = line;
        out.push(c);
        pos += 1;
        loop {
          match chars.get(pos) {
            None | Some('\n') => {
              return Err(MinifyError::new(start_line, "unterminated string"));
            }
            Some('\\') => {
              out.push('\\');
              pos += 1;
              if let Some(&next) = chars.get(pos) {
                if next == '\n' {
                  line += 1;
                }
                out.push(next);
                pos += 1;
              }
            }
            Some(&ch) => {
              out.push(ch);
              pos += 1;
              if ch == c {
                break;
              }
            }
          }
        }
      }
      '{' | '(' | '[' => {
        flush_space(&mut out, &mut pending_space, c);
        stack.push((c, line));
        out.push(c);
        pos += 1;
      }
      '}' | ')' | ']' => {
        let Some((open, open_line)) = stack.pop() else {
          return Err(MinifyError::new(line, format!("unexpected `{c}`")));
        };
        if closing_for(open) != c {
          return Err(MinifyError::new(
            line,
            format!("`{c}` does not close `{open}` opened at line {open_line}"),
          ));
        }
        pending_space = false;
        if c == '}' && out.ends_with(';') {
          out.pop();
        }
        out.push(c);
        pos += 1;
      }
      _ => {
        flush_space(&mut out, &mut pending_space, c);
        out.push(c);
        pos += 1;
      }
    }
  }

  if let Some((open, open_line)) = stack.last() {
    return Err(MinifyError::new(*open_line, format!("unclosed `{open}`")));
  }

  Ok(out)
}

fn flush_space(out: &mut String, pending: &mut bool, next: char) {
  if !std::mem::take(pending) {
    return;
  }
  let Some(last) = out.chars().next_back() else {
    return;
  };
  if !TRIM_AFTER.contains(last) && !TRIM_BEFORE.contains(next) {
    out.push(' ');
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn collapses_rules() {
    let source = "/* header */\nbody {\n  margin: 0;\n  color: #333;\n}\n\na > b,\nc .d:hover {\n  padding: 1px 2px;\n}\n";
    assert_eq!(
      minify_css(source).unwrap(),
      "body{margin:0;color:#333}a>b,c .d:hover{padding:1px 2px}"
    );
  }

  #[test]
  fn preserves_significant_spaces() {
    assert_eq!(
      minify_css("@media screen and (min-width: 10px) { a { width: calc(1px + 2px) } }").unwrap(),
      "@media screen and (min-width:10px){a{width:calc(1px + 2px)}}"
    );
  }

  #[test]
  fn keeps_strings_verbatim() {
    assert_eq!(
      minify_css("a::after { content: \"  /* not a comment */ \"; }").unwrap(),
      "a::after{content:\"  /* not a comment */ \"}"
    );
  }

  #[test]
  fn is_idempotent() {
    let once = minify_css("h1 , h2 { font : bold 12px/1.5 serif ; }\n@import url(\"x.css\") ;").unwrap();
    assert_eq!(minify_css(&once).unwrap(), once);
  }

  #[test]
  fn rejects_broken_stylesheets() {
    assert_eq!(minify_css("a { color: red;").unwrap_err().reason, "unclosed `{`");
    assert_eq!(minify_css("a { }\n}").unwrap_err().line, 2);
    assert_eq!(minify_css("/* open").unwrap_err().reason, "unterminated comment");
    assert_eq!(minify_css("a { content: 'x }").unwrap_err().reason, "unterminated string");
  }
}
