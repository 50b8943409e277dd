use bimap::BiMap;
use string_cache::DefaultAtom;

use crate::program::{strip_comment, Program};

/// Keyword of a label definition line, `bdl NAME;` or `bdl NAME:`.
pub const LABEL_KEYWORD: &str = "bdl ";

/**
  A label index maps label names to the (0-based) line that defines them, and back. It is built
  once from the whole program before execution starts. A label index is really just a
  convenience wrapper around a BiMap.
*/
#[derive(Default, Debug)]
pub struct LabelIndex {
  table: BiMap<DefaultAtom, usize>
}

impl LabelIndex {

  pub fn new() -> LabelIndex {
    LabelIndex{
      table: BiMap::new()
    }
  }

  /// Scans every line of the program. When a name is defined twice, the later definition wins.
  pub fn scan(program: &Program) -> LabelIndex {
    let mut index = LabelIndex::new();
    for (line, text) in program.lines().iter().enumerate() {
      if let Some(name) = label_definition(strip_comment(text)) {
        index.insert(name, line);
      }
    }
    index
  }

  pub fn insert(&mut self, name: &str, line: usize) {
    self.table.insert(DefaultAtom::from(name), line);
  }

  pub fn line_of(&self, name: &str) -> Option<usize> {
    self.table.get_by_left(&DefaultAtom::from(name)).copied()
  }

  pub fn label_at(&self, line: usize) -> Option<&DefaultAtom> {
    self.table.get_by_right(&line)
  }

  pub fn len(&self) -> usize {
    self.table.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }
}

/// The label name defined by `line`, if it is a label definition.
pub fn label_definition(line: &str) -> Option<&str> {
  if !line.starts_with(LABEL_KEYWORD) || !(line.ends_with(';') || line.ends_with(':')) {
    return None;
  }
  Some(line[LABEL_KEYWORD.len()..line.len() - 1].trim())
}
