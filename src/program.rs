//! A program is the immutable array of raw source lines. Jumps, labels and error reports all
//! address this array directly, so blank and comment-only lines are kept.

use std::fs;
use std::io;
use std::path::Path;

/// Everything after the first comment marker on a line is ignored.
pub const COMMENT_MARKER: char = '\\';
/// Lines starting with this prefix belong to the conditional block above them.
pub const NESTED_PREFIX: char = ';';

#[derive(Clone, Debug, Default)]
pub struct Program {
  lines: Vec<String>
}

impl Program {

  pub fn from_source(source: &str) -> Program {
    Program{
      lines: source.lines().map(str::to_string).collect()
    }
  }

  /// Reads a UTF-8 script file.
  pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Program> {
    let source = fs::read_to_string(path)?;
    Ok(Program::from_source(&source))
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  pub fn line(&self, index: usize) -> Option<&str> {
    self.lines.get(index).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /**
    The body of the nested line at `index`: comment stripped, nested prefix removed and trimmed.
    `None` if there is no such line or it is not nested.
  */
  pub fn nested_body(&self, index: usize) -> Option<&str> {
    let line = self.line(index)?;
    match line.starts_with(NESTED_PREFIX) {
      true  => Some(strip_comment(&line[NESTED_PREFIX.len_utf8()..]).trim()),
      false => None
    }
  }
}

/// Cuts the line at the first comment marker and removes trailing whitespace. Leading whitespace
/// is significant and kept.
pub fn strip_comment(line: &str) -> &str {
  let code = match line.find(COMMENT_MARKER) {
    Some(position) => &line[..position],
    None           => line
  };
  code.trim_end()
}
