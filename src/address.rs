//! Addresses of bits. A `BitId` is an index into the bit arena of a `BitStore`. The first
//! `STANDARD_POOL_SIZE` slots of every arena hold the standard pool, so a `StandardAddress`
//! converts to and from a `BitId` by arithmetic alone.

use std::fmt::{Display, Formatter};

pub const STANDARD_BANKS   : usize = 9;
pub const STANDARD_INDICES : usize = 9999;
/// A mutable and a constant bit for every bank/index pair.
pub const STANDARD_POOL_SIZE: usize = STANDARD_BANKS * STANDARD_INDICES * 2;

/// Marker distinguishing the constant twin of a standard bit, as in `3x0042C`.
pub const CONSTANT_MARKER: char = 'C';

/// Identity of a bit. Two lookups that return the same `BitId` returned the same bit.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct BitId(pub(crate) usize);

impl BitId {
  pub fn idx(&self) -> usize {
    self.0
  }

  pub fn is_standard(&self) -> bool {
    self.0 < STANDARD_POOL_SIZE
  }
}

impl Display for BitId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "BIT[{}]", self.0)
  }
}

/**
  The name of a standard bit, `{bank}x{index:04}` with an optional trailing `C` for the
  constant twin. Banks run from 1 to 9 and indices from 1 to 9999.
*/
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct StandardAddress {
  pub bank     : u8,
  pub index    : u16,
  pub constant : bool
}

impl StandardAddress {

  /// Parses an exact standard bit name. Anything else, including `1x1` or `01x0001`, is `None`.
  pub fn parse(name: &str) -> Option<StandardAddress> {
    let bytes = name.as_bytes();
    let constant =
      match bytes.len() {
        6 => false,
        7 if bytes[6] == CONSTANT_MARKER as u8 => true,
        _ => return None
      };

    if !(b'1'..=b'9').contains(&bytes[0]) || bytes[1] != b'x' {
      return None;
    }
    let digits = &bytes[2..6];
    if !digits.iter().all(u8::is_ascii_digit) {
      return None;
    }
    let index = digits.iter().fold(0u16, |acc, d| acc * 10 + (d - b'0') as u16);
    match index {
      0 => None,
      _ => Some(StandardAddress{ bank: bytes[0] - b'0', index, constant })
    }
  }

  /// Converts the address to an index into the bit arena.
  pub fn idx(&self) -> usize {
    let pair = (self.bank as usize - 1) * STANDARD_INDICES + (self.index as usize - 1);
    pair * 2 + self.constant as usize
  }

  /// Inverse of `idx`. Only meaningful for `idx < STANDARD_POOL_SIZE`.
  pub fn from_idx(idx: usize) -> StandardAddress {
    let pair = idx / 2;
    StandardAddress{
      bank     : (pair / STANDARD_INDICES + 1) as u8,
      index    : (pair % STANDARD_INDICES + 1) as u16,
      constant : idx % 2 == 1
    }
  }

  pub fn bit_id(&self) -> BitId {
    BitId(self.idx())
  }
}

impl Display for StandardAddress {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.constant {
      true  => write!(f, "{}x{:04}{}", self.bank, self.index, CONSTANT_MARKER),
      false => write!(f, "{}x{:04}", self.bank, self.index)
    }
  }
}

/**
  Splits a byte-indexed name of the form `group[index]`. Only the prefix has to match, so
  `byte[3]` and `byte[3]tail` both give `("byte", 3)`.
*/
pub fn split_indexed(name: &str) -> Option<(&str, usize)> {
  let open = name.find('[')?;
  let group = &name[..open];
  if group.is_empty() || !group.chars().all(is_word_char) {
    return None;
  }
  let rest = &name[open + 1..];
  let close = rest.find(']')?;
  let digits = &rest[..close];
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  digits.parse::<usize>().ok().map(|index| (group, index))
}

/// Characters of a word: letters, digits and underscore.
pub fn is_word_char(c: char) -> bool {
  c.is_alphanumeric() || c == '_'
}
