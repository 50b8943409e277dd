/*!
  Conditions of `cln` lines. A condition is a small integer expression over bit values, written
  with Python-like operators: `&carry == 1 and not &byte[0]`.

  Resolving a condition never fails. Text that doesn't parse, a bit that doesn't exist and
  arithmetic without a value (overflow, division by zero) all make the condition false. So does a
  condition longer than `MAX_CONDITION_LENGTH` or nested deeper than `MAX_NESTING`.
*/

mod expression;
mod parser;

pub use expression::{BinaryOp, Comparison, Expr, UnaryOp};
pub use parser::{parse_condition, MAX_CONDITION_LENGTH, MAX_NESTING};

use crate::store::BitStore;

/**
  Whether `text` holds against the current bit values. Bit references are looked up without
  creating anything, and every referenced bit must exist, even one a short-circuit would skip.
*/
pub fn resolve_condition(text: &str, store: &BitStore) -> bool {
  let expr =
    match parse_condition(text) {
      Ok(expr) => expr,
      Err(())  => return false
    };
  if expr.bit_names().iter().any(|name| store.find(name).is_none()) {
    return false;
  }
  let lookup = |name: &str| store.find(name).map(|id| store.value(id));
  matches!(expr.evaluate(&lookup), Some(value) if value != 0)
}


#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> BitStore {
    let mut store = BitStore::new();
    store.declare_bit("on", true);
    store.declare_bit("off", false);
    store.declare_group("byte", 0, 3);
    store
  }

  #[test]
  fn plain_comparisons(){
    let store = store();
    assert!(resolve_condition("&on == 1", &store));
    assert!(resolve_condition("&off == 0", &store));
    assert!(!resolve_condition("&on == 0", &store));
    assert!(resolve_condition("&on", &store));
    assert!(!resolve_condition("&off", &store));
    assert!(resolve_condition("&on != &off", &store));
  }

  #[test]
  fn boolean_operators(){
    let store = store();
    assert!(resolve_condition("&on and not &off", &store));
    assert!(resolve_condition("&off or &on", &store));
    assert!(!resolve_condition("&on and &off", &store));
    assert!(resolve_condition("0 <= &on < 2", &store));
    assert!(!resolve_condition("0 < &off < 2", &store));
  }

  #[test]
  fn bits_of_every_pool(){
    let store = store();
    assert!(resolve_condition("&byte[2] == 0", &store));
    assert!(resolve_condition("&1x0001 + &9x9999C == 0", &store));
    assert!(!resolve_condition("&byte[4] == 0", &store));
  }

  #[test]
  fn missing_bits_make_it_false(){
    let store = store();
    assert!(!resolve_condition("&nowhere == 0", &store));
    assert!(!resolve_condition("not &nowhere", &store));
    assert!(!resolve_condition("&on or &nowhere", &store));
    assert!(store.find("nowhere").is_none());
  }

  #[test]
  fn failures_make_it_false(){
    let store = store();
    assert!(!resolve_condition("", &store));
    assert!(!resolve_condition("&on ==", &store));
    assert!(!resolve_condition("1 // &off", &store));
    assert!(!resolve_condition("9223372036854775807 + &on", &store));
    assert!(resolve_condition("-7 // 2 == -4", &store));
  }

  #[test]
  fn oversized_conditions_are_false(){
    let store = store();
    let nested = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    assert!(!resolve_condition(&nested, &store));
    let chain = vec!["&on"; 200_000].join(" + ");
    assert!(!resolve_condition(&chain, &store));
    let shallow = format!("{}&on{}", "(".repeat(10), ")".repeat(10));
    assert!(resolve_condition(&shallow, &store));
  }
}
