//! Failures raised while a single line is dispatched. None of them is fatal to a run: the machine
//! reports them and moves on to the next line.

use strum_macros::IntoStaticStr;

use crate::gate::GateKind;

#[derive(thiserror::Error, IntoStaticStr, Debug)]
pub enum ExecError {
  #[error("unknown gate: {0}")]
  UnknownGate(String),

  #[error("bit name is empty")]
  EmptyBitName,

  /// Neither a declared byte group nor a standard bank prefix.
  #[error("undefined byte group or bit range: {0}")]
  UndefinedByteRange(String),

  #[error("index {index} is outside byte group {group}")]
  IndexOutsideGroup {
    group : String,
    index : usize
  },

  #[error("invalid number: {0}")]
  InvalidNumber(String),

  /// Line numbers in jump targets count from 1.
  #[error("invalid jump target: line {0}")]
  InvalidJumpTarget(usize),

  #[error("conditional blocks cannot be nested")]
  NestedConditional,

  #[error("{0} gate requires at least one input")]
  MissingGateInput(GateKind),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl ExecError {
  /// The variant name, used as the failure kind in line reports.
  pub fn kind(&self) -> &'static str {
    self.into()
  }
}

pub type ExecResult<T> = Result<T, ExecError>;


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_is_variant_name(){
    assert_eq!(ExecError::EmptyBitName.kind(), "EmptyBitName");
    assert_eq!(ExecError::UnknownGate("FOO".to_string()).kind(), "UnknownGate");
    assert_eq!(
      ExecError::IndexOutsideGroup{ group: "g".to_string(), index: 9 }.kind(),
      "IndexOutsideGroup"
    );
  }

  #[test]
  fn messages(){
    assert_eq!(ExecError::UnknownGate("FOO".to_string()).to_string(), "unknown gate: FOO");
    assert_eq!(
      ExecError::MissingGateInput(GateKind::Not).to_string(),
      "NOT gate requires at least one input"
    );
  }
}
