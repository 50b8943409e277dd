/*!
  The bit store owns every bit a program can reach: the fixed standard pool, the user pool that
  grows as names are declared or first looked up, and the byte groups whose members also live in
  the user pool under composite names like `byte[3]`.

  Bits are kept in one arena and addressed by `BitId`. The standard pool occupies the front of the
  arena in `StandardAddress::idx` order; user bits are appended behind it and never removed.
*/

use std::collections::{BTreeMap, HashMap};

use string_cache::DefaultAtom;

use crate::address::*;
use crate::bit::{Bit, BitName};
use crate::error::{ExecError, ExecResult};

/// A declared byte group: index to member bit, in index order.
pub type ByteGroup = BTreeMap<usize, BitId>;

pub struct BitStore {
  bits   : Vec<Bit>,
  user   : HashMap<DefaultAtom, BitId>,
  groups : HashMap<DefaultAtom, ByteGroup>
}

impl BitStore {

  pub fn new() -> BitStore {
    let bits =
      (0..STANDARD_POOL_SIZE)
        .map(|idx| Bit::standard(StandardAddress::from_idx(idx)))
        .collect();

    BitStore{
      bits,
      user   : HashMap::new(),
      groups : HashMap::new()
    }
  }

  // region Lookup

  /**
    Resolves `name` without side effects. The order is: user pool, standard pool, then a
    `group[index]` prefix against the declared byte groups.
  */
  pub fn find(&self, name: &str) -> Option<BitId> {
    if let Some(id) = self.user.get(&DefaultAtom::from(name)) {
      return Some(*id);
    }
    if let Some(address) = StandardAddress::parse(name) {
      return Some(address.bit_id());
    }
    let (group, index) = split_indexed(name)?;
    self.groups
        .get(&DefaultAtom::from(group))
        .and_then(|members| members.get(&index))
        .copied()
  }

  /**
    Resolves `name` like `find`, and registers a new mutable user bit with value 0 when nothing
    matches. Reading an unknown name therefore creates it. Blank names are rejected.
  */
  pub fn find_or_create(&mut self, name: &str) -> ExecResult<BitId> {
    if let Some(id) = self.find(name) {
      return Ok(id);
    }
    if name.trim().is_empty() {
      return Err(ExecError::EmptyBitName);
    }
    let atom = DefaultAtom::from(name);
    let id = self.alloc(Bit::user(atom.clone(), false));
    self.user.insert(atom, id);
    Ok(id)
  }

  pub fn group(&self, name: &str) -> Option<&ByteGroup> {
    self.groups.get(&DefaultAtom::from(name))
  }

  // endregion

  // region Declarations

  /// Binds `name` to a fresh user bit, replacing whatever the name referred to before.
  pub fn declare_bit(&mut self, name: &str, value: bool) -> BitId {
    let atom = DefaultAtom::from(name);
    let id = self.alloc(Bit::user(atom.clone(), value));
    self.user.insert(atom, id);
    id
  }

  /**
    Declares (or redeclares) the byte group `name` over the inclusive range `start..=end`. Every
    member is a fresh bit with value 0, also reachable from the user pool as `name[i]`. An empty
    range declares an empty group.
  */
  pub fn declare_group(&mut self, name: &str, start: usize, end: usize) {
    let mut members = ByteGroup::new();
    for index in start..=end {
      let member = DefaultAtom::from(format!("{}[{}]", name, index));
      let id = self.alloc(Bit::user(member.clone(), false));
      self.user.insert(member, id);
      members.insert(index, id);
    }
    self.groups.insert(DefaultAtom::from(name), members);
  }

  fn alloc(&mut self, bit: Bit) -> BitId {
    self.bits.push(bit);
    BitId(self.bits.len() - 1)
  }

  // endregion

  // region Bit access

  pub fn bit(&self, id: BitId) -> &Bit {
    &self.bits[id.idx()]
  }

  pub fn value(&self, id: BitId) -> bool {
    self.bits[id.idx()].value()
  }

  pub fn name(&self, id: BitId) -> &BitName {
    &self.bits[id.idx()].name
  }

  pub fn is_constant(&self, id: BitId) -> bool {
    self.bits[id.idx()].constant
  }

  /// No-op on constant bits.
  pub fn set(&mut self, id: BitId, value: bool) {
    self.bits[id.idx()].set(value);
  }

  /// No-op on constant bits.
  pub fn toggle(&mut self, id: BitId) {
    self.bits[id.idx()].toggle();
  }

  /// Exchanges the values of two bits. Constancy is not checked.
  pub fn swap(&mut self, a: BitId, b: BitId) {
    let value_a = self.value(a);
    let value_b = self.value(b);
    self.bits[a.idx()].force(value_b);
    self.bits[b.idx()].force(value_a);
  }

  /// The user pool in name order, for display.
  pub fn user_bits(&self) -> Vec<(&DefaultAtom, &Bit)> {
    let mut entries: Vec<(&DefaultAtom, &Bit)> =
      self.user
          .iter()
          .map(|(name, id)| (name, self.bit(*id)))
          .collect();
    entries.sort_by_key(|(name, _)| name.to_string());
    entries
  }

  // endregion

  // region Shifting

  /**
    Shifts the values of `group[start..=end]` by `shift` positions: `value(i) <- value(i - shift)`.
    A source index that is not a member of the group reads as 0.

    For a positive shift, indices are processed from `end` down to `start`, so every destination
    reads its source before the source is overwritten. A negative shift runs from `start` up to
    `end` for the same reason.

    `group` is a declared byte group or, failing that, a standard bank prefix such as `1x`, whose
    members are the standard bits `1x{i:04}` for `i` in the range. Every index in the range must be
    a member; this is checked before any bit changes.
  */
  pub fn shift(&mut self, group: &str, start: usize, end: usize, shift: i64) -> ExecResult<()> {
    let members = self.shift_members(group, start, end)?;

    if let Some(index) = (start..=end).find(|i| !members.contains_key(i)) {
      return Err(ExecError::IndexOutsideGroup{ group: group.to_string(), index });
    }

    if shift == 0 {
      return Ok(());
    }
    let indices: Vec<usize> =
      match shift > 0 {
        true  => (start..=end).rev().collect(),
        false => (start..=end).collect()
      };

    for index in indices {
      let source =
        (index as i64)
          .checked_sub(shift)
          .and_then(|source| usize::try_from(source).ok())
          .and_then(|source| members.get(&source))
          .map_or(false, |id| self.value(*id));
      self.set(members[&index], source);
    }
    Ok(())
  }

  fn shift_members(&self, group: &str, start: usize, end: usize) -> ExecResult<ByteGroup> {
    if let Some(members) = self.group(group) {
      return Ok(members.clone());
    }

    let mut members = ByteGroup::new();
    if is_bank_prefix(group) {
      // Only indices 1..=9999 can name a standard bit.
      for index in start.max(1)..=end.min(STANDARD_INDICES) {
        if let Some(address) = StandardAddress::parse(&format!("{}{:04}", group, index)) {
          members.insert(index, address.bit_id());
        }
      }
    }
    match members.is_empty() {
      true  => Err(ExecError::UndefinedByteRange(group.to_string())),
      false => Ok(members)
    }
  }

  // endregion
}

impl Default for BitStore {
  fn default() -> Self {
    BitStore::new()
  }
}

/// One or more digits followed by `x`, the start of a standard bit name.
fn is_bank_prefix(name: &str) -> bool {
  let digits = name.bytes().take_while(u8::is_ascii_digit).count();
  digits > 0 && name[digits..].starts_with('x')
}
