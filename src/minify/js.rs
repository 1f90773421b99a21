//! Script minification.

use super::{MinifyError, closing_for};

/// Keywords after which a `/` starts a regular expression rather than a division.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
  "return",
  "typeof",
  "instanceof",
  "in",
  "of",
  "new",
  "delete",
  "void",
  "throw",
  "case",
  "do",
  "else",
  "yield",
  "await",
];

/// Punctuation after which a `/` starts a regular expression.
const REGEX_PREFIX_PUNCTUATION: &str = "(,=:[!&|?{};+-*%<>~^}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Gap {
  None,
  Space,
  Newline,
}

#[derive(Debug, Clone, Copy)]
struct Open {
  /// Opening bracket, or a backtick for a template substitution.
  ch: char,
  line: usize,
}

/// Strip comments and redundant whitespace from JavaScript.
///
/// Line breaks are kept wherever automatic semicolon insertion could depend on them.
pub fn minify_js(source: &str) -> Result<String, MinifyError> {
  ScriptMinifier::new(source).run()
}

struct ScriptMinifier {
  chars: Vec<char>,
  pos: usize,
  line: usize,
  out: String,
  gap: Gap,
  stack: Vec<Open>,
  last_word: String,
  /// Whether `last_word` is a property name written after `.`.
  word_after_dot: bool,
}

impl ScriptMinifier {
  fn new(source: &str) -> Self {
    Self {
      chars: source.chars().collect(),
      pos: 0,
      line: 1,
      out: String::with_capacity(source.len()),
      gap: Gap::None,
      stack: Vec::new(),
      last_word: String::new(),
      word_after_dot: false,
    }
  }

  fn run(mut self) -> Result<String, MinifyError> {
    while let Some(c) = self.peek(0) {
      match c {
        '\n' => {
          self.gap = self.gap.max(Gap::Newline);
          self.line += 1;
          self.pos += 1;
        }
        c if c.is_whitespace() => {
          self.gap = self.gap.max(Gap::Space);
          self.pos += 1;
        }
        '/' if self.peek(1) == Some('/') => self.skip_line_comment(),
        '/' if self.peek(1) == Some('*') => self.skip_block_comment()?,
        '"' | '\'' => {
          self.flush_gap(c);
          self.copy_string(c)?;
        }
        '`' => {
          self.flush_gap(c);
          self.out.push('`');
          self.pos += 1;
          self.copy_template()?;
        }
        '/' if self.regex_allowed() => {
          self.flush_gap(c);
          self.copy_regex()?;
        }
        '(' | '[' | '{' => {
          self.flush_gap(c);
          self.stack.push(Open {
            ch: c,
            line: self.line,
          });
          self.emit(c);
          self.pos += 1;
        }
        ')' | ']' | '}' => self.close(c)?,
        _ => {
          self.flush_gap(c);
          self.emit(c);
          self.pos += 1;
        }
      }
    }

    if let Some(open) = self.stack.last() {
      let reason = if open.ch == '`' {
        "unterminated template literal".to_string()
      } else {
        format!("unclosed `{}`", open.ch)
      };
      return Err(MinifyError::new(open.line, reason));
    }

    Ok(self.out)
  }

  fn peek(&self, offset: usize) -> Option<char> {
    self.chars.get(self.pos + offset).copied()
  }

  fn emit(&mut self, c: char) {
    if is_word(c) {
      let previous = self.out.chars().next_back();
      if !previous.is_some_and(is_word) {
        self.last_word.clear();
        self.word_after_dot = previous == Some('.');
      }
      self.last_word.push(c);
    }
    self.out.push(c);
  }

  fn flush_gap(&mut self, next: char) {
    let gap = std::mem::replace(&mut self.gap, Gap::None);
    let Some(last) = self.out.chars().next_back() else {
      return;
    };

    match gap {
      Gap::None => {}
      Gap::Newline if !"{;,([".contains(last) && !"});,]".contains(next) => self.out.push('\n'),
      Gap::Newline | Gap::Space => {
        if needs_space(last, next) {
          self.out.push(' ');
        }
      }
    }
  }

  fn regex_allowed(&self) -> bool {
    // Postfix `++`/`--` end an operand, so a following `/` divides.
    if self.out.ends_with("++") || self.out.ends_with("--") {
      return false;
    }
    match self.out.chars().next_back() {
      None => true,
      Some(c) if is_word(c) => {
        !self.word_after_dot && REGEX_PREFIX_KEYWORDS.contains(&self.last_word.as_str())
      }
      Some(c) => REGEX_PREFIX_PUNCTUATION.contains(c),
    }
  }

  fn close(&mut self, c: char) -> Result<(), MinifyError> {
    let Some(open) = self.stack.pop() else {
      return Err(MinifyError::new(self.line, format!("unexpected `{c}`")));
    };

    if open.ch == '`' {
      if c != '}' {
        return Err(MinifyError::new(
          self.line,
          format!("unexpected `{c}` inside template substitution"),
        ));
      }
      self.gap = Gap::None;
      self.emit('}');
      self.pos += 1;
      return self.copy_template();
    }

    if closing_for(open.ch) != c {
      return Err(MinifyError::new(
        self.line,
        format!(
          "`{c}` does not close `{}` opened at line {}",
          open.ch, open.line
        ),
      ));
    }

    self.flush_gap(c);
    self.emit(c);
    self.pos += 1;
    Ok(())
  }

  fn skip_line_comment(&mut self) {
    self.gap = self.gap.max(Gap::Space);
    while let Some(c) = self.peek(0) {
      if c == '\n' {
        break;
      }
      self.pos += 1;
    }
  }

  fn skip_block_comment(&mut self) -> Result<(), MinifyError> {
    let start_line = self.line;
    let mut gap = Gap::Space;
    self.pos += 2;
    loop {
      match self.peek(0) {
        None => return Err(MinifyError::new(start_line, "unterminated block comment")),
        Some('*') if self.peek(1) == Some('/') => {
          self.pos += 2;
          break;
        }
        Some('\n') => {
          self.line += 1;
          gap = Gap::Newline;
          self.pos += 1;
        }
        Some(_) => self.pos += 1,
      }
    }
    self.gap = self.gap.max(gap);
    Ok(())
  }

  fn copy_escape(&mut self) {
    self.out.push('\\');
    self.pos += 1;
    if let Some(next) = self.peek(0) {
      if next == '\n' {
        self.line += 1;
      }
      self.out.push(next);
      self.pos += 1;
    }
  }

  fn copy_string(&mut self, quote: char) -> Result<(), MinifyError> {
    let start_line = self.line;
    self.out.push(quote);
    self.pos += 1;
    loop {
      match self.peek(0) {
        None | Some('\n') => {
          return Err(MinifyError::new(start_line, "unterminated string literal"));
        }
        Some('\\') => self.copy_escape(),
        Some(c) => {
          self.out.push(c);
          self.pos += 1;
          if c == quote {
            return Ok(());
          }
        }
      }
    }
  }

  /// Copy template text up to the closing backtick or the next `${`.
  fn copy_template(&mut self) -> Result<(), MinifyError> {
    let start_line = self.line;
    loop {
      match self.peek(0) {
        None => return Err(MinifyError::new(start_line, "unterminated template literal")),
        Some('\\') => self.copy_escape(),
        Some('`') => {
          self.out.push('`');
          self.pos += 1;
          return Ok(());
        }
        Some('$') if self.peek(1) == Some('{') => {
          self.out.push_str("${");
          self.pos += 2;
          self.stack.push(Open {
            ch: '`',
            line: self.line,
          });
          return Ok(());
        }
        Some(c) => {
          if c == '\n' {
            self.line += 1;
          }
          self.out.push(c);
          self.pos += 1;
        }
      }
    }
  }

  fn copy_regex(&mut self) -> Result<(), MinifyError> {
    let start_line = self.line;
    let mut in_class = false;
    self.out.push('/');
    self.pos += 1;
    loop {
      match self.peek(0) {
        None | Some('\n') => {
          return Err(MinifyError::new(start_line, "unterminated regular expression"));
        }
        Some('\\') => {
          self.out.push('\\');
          self.pos += 1;
          if let Some(next) = self.peek(0)
            && next != '\n'
          {
            self.out.push(next);
            self.pos += 1;
          }
        }
        Some(c) => {
          self.out.push(c);
          self.pos += 1;
          match c {
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => return Ok(()),
            _ => {}
          }
        }
      }
    }
  }
}

fn is_word(c: char) -> bool {
  c.is_alphanumeric() || c == '_' || c == '$' || c == '\\' || !c.is_ascii()
}

fn needs_space(last: char, next: char) -> bool {
  (is_word(last) && is_word(next))
    || (last == '+' && next == '+')
    || (last == '-' && next == '-')
    || (last == '/' && (next == '/' || next == '*'))
    || (last.is_ascii_digit() && next == '.')
}
