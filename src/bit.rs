use std::fmt::{Display, Formatter};

use string_cache::DefaultAtom;

use crate::address::StandardAddress;

/// Standard bit names are derived from their address, so only user bits carry an interned name.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BitName {
  Standard(StandardAddress),
  User(DefaultAtom)
}

impl Display for BitName {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      BitName::Standard(address) => write!(f, "{}", address),
      BitName::User(name)        => write!(f, "{}", name)
    }
  }
}

/**
  A named single-bit cell. Constant bits ignore `set` and `toggle`; the store's `swap` is the one
  operation that writes them anyway.
*/
#[derive(Clone, Debug)]
pub struct Bit {
  pub name     : BitName,
  value        : bool,
  pub constant : bool
}

impl Bit {

  pub fn standard(address: StandardAddress) -> Bit {
    Bit{
      name     : BitName::Standard(address),
      value    : false,
      constant : address.constant
    }
  }

  pub fn user(name: DefaultAtom, value: bool) -> Bit {
    Bit{
      name     : BitName::User(name),
      value,
      constant : false
    }
  }

  pub fn value(&self) -> bool {
    self.value
  }

  pub fn set(&mut self, value: bool) {
    if !self.constant {
      self.value = value;
    }
  }

  pub fn toggle(&mut self) {
    if !self.constant {
      self.value ^= true;
    }
  }

  /// Writes the value whether or not the bit is constant.
  pub(crate) fn force(&mut self, value: bool) {
    self.value = value;
  }
}

impl Display for Bit {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} = {}", self.name, self.value as u8)
  }
}
