//! Logic gates. Evaluation is pure: a gate kind and an ordered list of input values give one
//! output value. `Gate` and `Connection` bind the inputs and output to bits of a `BitStore`.

use std::str::FromStr;

use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::address::BitId;
use crate::error::{ExecError, ExecResult};
use crate::store::BitStore;

#[derive(
StrumDisplay, EnumString, IntoStaticStr,
Clone,        Copy,       Eq, PartialEq, Debug, Hash
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum GateKind {
  And,
  Or,
  /// Negates its first input and ignores the rest.
  Not,
  /// Parity of all inputs.
  Xor,
  Nand,
  Nor
}

impl GateKind {
  /// Gate names are matched exactly, so `AND` is a gate and `and` is not.
  pub fn from_name(name: &str) -> ExecResult<GateKind> {
    GateKind::from_str(name).map_err(|_| ExecError::UnknownGate(name.to_string()))
  }
}

pub fn evaluate(kind: GateKind, inputs: &[bool]) -> ExecResult<bool> {
  let output =
    match kind {
      GateKind::And  => inputs.iter().all(|v| *v),
      GateKind::Or   => inputs.iter().any(|v| *v),
      GateKind::Not  => {
        match inputs.first() {
          Some(value) => !value,
          None        => return Err(ExecError::MissingGateInput(kind))
        }
      }
      GateKind::Xor  => inputs.iter().filter(|v| **v).count() % 2 == 1,
      GateKind::Nand => !inputs.iter().all(|v| *v),
      GateKind::Nor  => !inputs.iter().any(|v| *v),
    };
  Ok(output)
}

/// A gate over bits of a store. The inputs are shared references into the store, not copies.
#[derive(Clone, Debug)]
pub struct Gate {
  pub kind   : GateKind,
  pub inputs : Vec<BitId>
}

impl Gate {
  pub fn new(kind: GateKind, inputs: Vec<BitId>) -> Gate {
    Gate{ kind, inputs }
  }

  /// Evaluates over the current values of the inputs.
  pub fn evaluate(&self, store: &BitStore) -> ExecResult<bool> {
    let values: Vec<bool> = self.inputs.iter().map(|id| store.value(*id)).collect();
    evaluate(self.kind, &values)
  }
}

/**
  Wires a gate's result into an output bit. Latching evaluates the gate once and writes the result;
  later changes to the inputs are not propagated.
*/
#[derive(Clone, Debug)]
pub struct Connection {
  pub output : BitId,
  pub gate   : Gate
}

impl Connection {
  pub fn new(output: BitId, gate: Gate) -> Connection {
    Connection{ output, gate }
  }

  /// Writes the gate's current result into the output bit, unless that bit is constant.
  pub fn latch(&self, store: &mut BitStore) -> ExecResult<bool> {
    let result = self.gate.evaluate(store)?;
    store.set(self.output, result);
    Ok(result)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn bits(values: &[u8]) -> Vec<bool> {
    values.iter().map(|v| *v == 1).collect()
  }

  #[test]
  fn truth_table(){
    assert_eq!(evaluate(GateKind::And,  &bits(&[1, 1, 0])).unwrap(), false);
    assert_eq!(evaluate(GateKind::Or,   &bits(&[0, 0, 1])).unwrap(), true);
    assert_eq!(evaluate(GateKind::Xor,  &bits(&[1, 1, 1])).unwrap(), true);
    assert_eq!(evaluate(GateKind::Not,  &bits(&[0])).unwrap(), true);
    assert_eq!(evaluate(GateKind::Nand, &bits(&[1, 1])).unwrap(), false);
    assert_eq!(evaluate(GateKind::Nor,  &bits(&[0, 0])).unwrap(), true);
  }

  #[test]
  fn not_uses_first_input_only(){
    assert_eq!(evaluate(GateKind::Not, &bits(&[1, 0, 0])).unwrap(), false);
    assert!(matches!(evaluate(GateKind::Not, &[]), Err(ExecError::MissingGateInput(GateKind::Not))));
  }

  #[test]
  fn empty_inputs(){
    assert_eq!(evaluate(GateKind::And, &[]).unwrap(), true);
    assert_eq!(evaluate(GateKind::Or, &[]).unwrap(), false);
    assert_eq!(evaluate(GateKind::Xor, &[]).unwrap(), false);
  }

  #[test]
  fn gate_names(){
    assert_eq!(GateKind::from_name("NAND").unwrap(), GateKind::Nand);
    assert_eq!(GateKind::Xor.to_string(), "XOR");
    match GateKind::from_name("and") {
      Err(ExecError::UnknownGate(name)) => assert_eq!(name, "and"),
      other => panic!("unexpected {:?}", other)
    }
  }

  #[test]
  fn connection_latches_once(){
    let mut store = BitStore::new();
    let a = store.declare_bit("a", true);
    let b = store.declare_bit("b", true);
    let out = store.declare_bit("out", false);
    let connection = Connection::new(out, Gate::new(GateKind::And, vec![a, b]));

    assert_eq!(connection.latch(&mut store).unwrap(), true);
    assert!(store.value(out));

    // Not a live circuit.
    store.set(a, false);
    assert!(store.value(out));
  }

  #[test]
  fn connection_respects_constant_output(){
    let mut store = BitStore::new();
    let a = store.declare_bit("a", false);
    let out = store.find("1x0001C").unwrap();
    let connection = Connection::new(out, Gate::new(GateKind::Not, vec![a]));
    assert_eq!(connection.latch(&mut store).unwrap(), true);
    assert!(!store.value(out));
  }
}
