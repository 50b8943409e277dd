use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumString};

#[derive(StrumDisplay, Clone, Copy, Eq, PartialEq, Debug)]
pub enum UnaryOp {
  #[strum(serialize = "-")]
  Negate,
  #[strum(serialize = "+")]
  Plus,
  #[strum(serialize = "~")]
  Invert,
}

#[derive(StrumDisplay, EnumString, Clone, Copy, Eq, PartialEq, Debug)]
pub enum BinaryOp {
  #[strum(serialize = "**")]
  Power,
  #[strum(serialize = "*")]
  Multiply,
  #[strum(serialize = "//")]
  FloorDivide,
  #[strum(serialize = "%")]
  Modulo,
  #[strum(serialize = "+")]
  Add,
  #[strum(serialize = "-")]
  Subtract,
  #[strum(serialize = "<<")]
  ShiftLeft,
  #[strum(serialize = ">>")]
  ShiftRight,
  #[strum(serialize = "&")]
  BitAnd,
  #[strum(serialize = "^")]
  BitXor,
  #[strum(serialize = "|")]
  BitOr,
}

#[derive(StrumDisplay, EnumString, Clone, Copy, Eq, PartialEq, Debug)]
pub enum Comparison {
  #[strum(serialize = "==")]
  Equal,
  #[strum(serialize = "!=")]
  NotEqual,
  #[strum(serialize = "<")]
  Less,
  #[strum(serialize = "<=")]
  LessEqual,
  #[strum(serialize = ">")]
  Greater,
  #[strum(serialize = ">=")]
  GreaterEqual,
}

impl Comparison {
  fn holds(&self, lhs: i64, rhs: i64) -> bool {
    match self {
      Comparison::Equal        => lhs == rhs,
      Comparison::NotEqual     => lhs != rhs,
      Comparison::Less         => lhs <  rhs,
      Comparison::LessEqual    => lhs <= rhs,
      Comparison::Greater      => lhs >  rhs,
      Comparison::GreaterEqual => lhs >= rhs,
    }
  }
}

/**
  The syntax tree of a condition. Every value is an integer; truth is "non-zero". Bits read as 0
  or 1 and are named exactly as they were written after the `&`.
*/
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Expr {
  Integer(i64),
  Bit(String),
  Unary(UnaryOp, Box<Expr>),
  Binary(BinaryOp, Box<Expr>, Box<Expr>),
  /// `a < b <= c` holds when every adjacent pair does. Each operand is evaluated at most once.
  Compare(Box<Expr>, Vec<(Comparison, Expr)>),
  Not(Box<Expr>),
  And(Box<Expr>, Box<Expr>),
  Or(Box<Expr>, Box<Expr>),
}

impl Expr {

  /// Names of every bit the expression mentions, in order of appearance.
  pub fn bit_names(&self) -> Vec<&str> {
    let mut names = Vec::new();
    self.collect_bit_names(&mut names);
    names
  }

  fn collect_bit_names<'a>(&'a self, names: &mut Vec<&'a str>) {
    match self {
      Expr::Integer(_) => {}
      Expr::Bit(name)  => names.push(name),
      Expr::Unary(_, operand)
      | Expr::Not(operand) => operand.collect_bit_names(names),
      Expr::Binary(_, lhs, rhs)
      | Expr::And(lhs, rhs)
      | Expr::Or(lhs, rhs) => {
        lhs.collect_bit_names(names);
        rhs.collect_bit_names(names);
      }
      Expr::Compare(first, rest) => {
        first.collect_bit_names(names);
        for (_, operand) in rest {
          operand.collect_bit_names(names);
        }
      }
    }
  }

  /**
    Evaluates the expression, reading bits through `lookup`. `and` and `or` short-circuit and
    produce one of their operands. `None` means the expression has no integer value: a bit that
    `lookup` can't find, overflow, division by zero, or a negative shift count or exponent.
  */
  pub fn evaluate<F>(&self, lookup: &F) -> Option<i64>
    where F: Fn(&str) -> Option<bool>
  {
    match self {

      Expr::Integer(value) => Some(*value),

      Expr::Bit(name) => lookup(name).map(i64::from),

      Expr::Unary(op, operand) => {
        let value = operand.evaluate(lookup)?;
        match op {
          UnaryOp::Negate => value.checked_neg(),
          UnaryOp::Plus   => Some(value),
          UnaryOp::Invert => Some(!value),
        }
      }

      Expr::Binary(op, lhs, rhs) => {
        let lhs = lhs.evaluate(lookup)?;
        let rhs = rhs.evaluate(lookup)?;
        apply(*op, lhs, rhs)
      }

      Expr::Compare(first, rest) => {
        let mut lhs = first.evaluate(lookup)?;
        for (comparison, operand) in rest {
          let rhs = operand.evaluate(lookup)?;
          if !comparison.holds(lhs, rhs) {
            return Some(0);
          }
          lhs = rhs;
        }
        Some(1)
      }

      Expr::Not(operand) => Some((operand.evaluate(lookup)? == 0) as i64),

      Expr::And(lhs, rhs) => {
        let value = lhs.evaluate(lookup)?;
        match value {
          0 => Some(0),
          _ => rhs.evaluate(lookup)
        }
      }

      Expr::Or(lhs, rhs) => {
        let value = lhs.evaluate(lookup)?;
        match value {
          0 => rhs.evaluate(lookup),
          _ => Some(value)
        }
      }

    }
  }
}

fn apply(op: BinaryOp, lhs: i64, rhs: i64) -> Option<i64> {
  match op {
    BinaryOp::Power       => lhs.checked_pow(u32::try_from(rhs).ok()?),
    BinaryOp::Multiply    => lhs.checked_mul(rhs),
    BinaryOp::FloorDivide => floor_divide(lhs, rhs),
    BinaryOp::Modulo      => floor_modulo(lhs, rhs),
    BinaryOp::Add         => lhs.checked_add(rhs),
    BinaryOp::Subtract    => lhs.checked_sub(rhs),
    BinaryOp::ShiftLeft   => shift_left(lhs, rhs),
    BinaryOp::ShiftRight  => shift_right(lhs, rhs),
    BinaryOp::BitAnd      => Some(lhs & rhs),
    BinaryOp::BitXor      => Some(lhs ^ rhs),
    BinaryOp::BitOr       => Some(lhs | rhs),
  }
}

/// Rounds toward negative infinity.
fn floor_divide(lhs: i64, rhs: i64) -> Option<i64> {
  let quotient  = lhs.checked_div(rhs)?;
  let remainder = lhs.checked_rem(rhs)?;
  match remainder != 0 && (remainder < 0) != (rhs < 0) {
    true  => quotient.checked_sub(1),
    false => Some(quotient)
  }
}

/// The remainder takes the sign of the divisor.
fn floor_modulo(lhs: i64, rhs: i64) -> Option<i64> {
  let remainder = lhs.checked_rem(rhs)?;
  match remainder != 0 && (remainder < 0) != (rhs < 0) {
    true  => Some(remainder + rhs),
    false => Some(remainder)
  }
}

fn shift_left(lhs: i64, count: i64) -> Option<i64> {
  if count < 0 {
    return None;
  }
  if lhs == 0 {
    return Some(0);
  }
  let count = u32::try_from(count).ok().filter(|count| *count < i64::BITS)?;
  let shifted = lhs << count;
  match shifted >> count == lhs {
    true  => Some(shifted),
    false => None
  }
}

fn shift_right(lhs: i64, count: i64) -> Option<i64> {
  if count < 0 {
    return None;
  }
  match u32::try_from(count) {
    Ok(count) if count < i64::BITS => Some(lhs >> count),
    _                              => Some(if lhs < 0 { -1 } else { 0 })
  }
}

/// Fully parenthesised, so the structure of the tree can be read off the text.
impl Display for Expr {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Expr::Integer(value)           => write!(f, "{}", value),
      Expr::Bit(name)                => write!(f, "&{}", name),
      Expr::Unary(op, operand)       => write!(f, "({}{})", op, operand),
      Expr::Binary(op, lhs, rhs)     => write!(f, "({} {} {})", lhs, op, rhs),
      Expr::Compare(first, rest)     => {
        write!(f, "({}", first)?;
        for (comparison, operand) in rest {
          write!(f, " {} {}", comparison, operand)?;
        }
        write!(f, ")")
      }
      Expr::Not(operand)             => write!(f, "(not {})", operand),
      Expr::And(lhs, rhs)            => write!(f, "({} and {})", lhs, rhs),
      Expr::Or(lhs, rhs)             => write!(f, "({} or {})", lhs, rhs),
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn no_bits(_: &str) -> Option<bool> {
    None
  }

  fn binary(op: BinaryOp, lhs: i64, rhs: i64) -> Expr {
    Expr::Binary(op, Box::new(Expr::Integer(lhs)), Box::new(Expr::Integer(rhs)))
  }

  #[test]
  fn floor_arithmetic(){
    assert_eq!(floor_divide(7, 2), Some(3));
    assert_eq!(floor_divide(-7, 2), Some(-4));
    assert_eq!(floor_divide(7, -2), Some(-4));
    assert_eq!(floor_divide(1, 0), None);
    assert_eq!(floor_modulo(-7, 2), Some(1));
    assert_eq!(floor_modulo(7, -2), Some(-1));
    assert_eq!(floor_modulo(6, 3), Some(0));
    assert_eq!(floor_modulo(i64::MIN, -1), None);
  }

  #[test]
  fn shifts(){
    assert_eq!(shift_left(1, 3), Some(8));
    assert_eq!(shift_left(1, 63), None);
    assert_eq!(shift_left(0, 200), Some(0));
    assert_eq!(shift_left(1, -1), None);
    assert_eq!(shift_right(-8, 1), Some(-4));
    assert_eq!(shift_right(-8, 100), Some(-1));
    assert_eq!(shift_right(8, 100), Some(0));
  }

  #[test]
  fn overflow_has_no_value(){
    assert_eq!(binary(BinaryOp::Add, i64::MAX, 1).evaluate(&no_bits), None);
    assert_eq!(binary(BinaryOp::Power, 2, -1).evaluate(&no_bits), None);
    assert_eq!(binary(BinaryOp::Power, 2, 10).evaluate(&no_bits), Some(1024));
  }

  #[test]
  fn short_circuit_skips_the_right_operand(){
    let missing = Box::new(Expr::Bit("missing".to_string()));
    let and = Expr::And(Box::new(Expr::Integer(0)), missing.clone());
    let or  = Expr::Or(Box::new(Expr::Integer(5)), missing);
    assert_eq!(and.evaluate(&no_bits), Some(0));
    assert_eq!(or.evaluate(&no_bits), Some(5));
    assert_eq!(and.bit_names(), vec!["missing"]);
  }

  #[test]
  fn bits_read_as_integers(){
    let lookup = |name: &str| match name {
      "on"  => Some(true),
      "off" => Some(false),
      _     => None
    };
    let sum = Expr::Binary(
      BinaryOp::Add,
      Box::new(Expr::Bit("on".to_string())),
      Box::new(Expr::Bit("off".to_string()))
    );
    assert_eq!(sum.evaluate(&lookup), Some(1));
    assert_eq!(Expr::Bit("other".to_string()).evaluate(&lookup), None);
  }
}
