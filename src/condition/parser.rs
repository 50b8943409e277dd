/*!
  The condition grammar, from loosest to tightest binding:
    ```text
    <or>      ::= <and> ('or' <and>)*
    <and>     ::= <not> ('and' <not>)*
    <not>     ::= 'not' <not> | <compare>
    <compare> ::= <bitor> (('==' | '!=' | '<=' | '>=' | '<' | '>') <bitor>)*
    <bitor>   ::= <bitxor> ('|' <bitxor>)*
    <bitxor>  ::= <bitand> ('^' <bitand>)*
    <bitand>  ::= <shift> ('&' <shift>)*
    <shift>   ::= <sum> (('<<' | '>>') <sum>)*
    <sum>     ::= <term> (('+' | '-') <term>)*
    <term>    ::= <unary> (('*' | '//' | '%') <unary>)*
    <unary>   ::= ('-' | '+' | '~') <unary> | <power>
    <power>   ::= <atom> ('**' <unary>)?
    <atom>    ::= <integer> | 'True' | 'False' | '&' <bit_name> | '(' <or> ')'
    <bit_name>::= [A-Za-z0-9_\[\]]+
    ```
  Whitespace is allowed between any two tokens. An `&` directly followed by a bit name character
  is a bit reference; otherwise it is the bitwise-and operator.
*/

use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::{tag, take_while1},
  character::complete::{char as one_char, digit1, multispace0, satisfy},
  combinator::{all_consuming, map, map_res, not, opt, value},
  error::{Error as NomError, ErrorKind},
  multi::many0,
  sequence::{delimited, pair, preceded, terminated},
  Err as NomErr,
  IResult
};

use crate::address::is_word_char;
use super::expression::{BinaryOp, Comparison, Expr, UnaryOp};

/// Longer conditions are rejected. This also bounds the depth of any operator chain.
pub const MAX_CONDITION_LENGTH: usize = 1024;
/// How deeply parentheses, `not`, unary operators and exponents may nest.
pub const MAX_NESTING: usize = 32;

/// Parses a whole condition. Trailing text that isn't part of the expression is an error.
pub fn parse_condition(text: &str) -> Result<Expr, ()> {
  if text.len() > MAX_CONDITION_LENGTH {
    return Err(());
  }
  match all_consuming(terminated(|text| por(text, 0), multispace0))(text) {
    Ok((_, expr)) => Ok(expr),
    Err(_)        => Err(())
  }
}

fn is_bit_name_char(c: char) -> bool {
  is_word_char(c) || c == '[' || c == ']'
}

/// Folds a left-associative operator chain.
fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
  rest.into_iter().fold(
    first,
    |lhs, (op, rhs)| Expr::Binary(op, Box::new(lhs), Box::new(rhs))
  )
}

/// Fails without backtracking once `depth` is past `MAX_NESTING`.
fn check_nesting(text: &str, depth: usize) -> Result<(), NomErr<NomError<&str>>> {
  match depth > MAX_NESTING {
    true  => Err(NomErr::Failure(NomError::new(text, ErrorKind::TooLarge))),
    false => Ok(())
  }
}

// region Boolean layer

fn por(text: &str, depth: usize) -> IResult<&str, Expr> {
  check_nesting(text, depth)?;
  let (text, first) = pand(text, depth)?;
  let (text, rest)  = many0(preceded(pkeyword("or"), |text| pand(text, depth)))(text)?;
  let expr = rest.into_iter().fold(first, |lhs, rhs| Expr::Or(Box::new(lhs), Box::new(rhs)));
  Ok((text, expr))
}

fn pand(text: &str, depth: usize) -> IResult<&str, Expr> {
  let (text, first) = pnot(text, depth)?;
  let (text, rest)  = many0(preceded(pkeyword("and"), |text| pnot(text, depth)))(text)?;
  let expr = rest.into_iter().fold(first, |lhs, rhs| Expr::And(Box::new(lhs), Box::new(rhs)));
  Ok((text, expr))
}

fn pnot(text: &str, depth: usize) -> IResult<&str, Expr> {
  check_nesting(text, depth)?;
  alt((
    map(
      preceded(pkeyword("not"), |text| pnot(text, depth + 1)),
      |operand| Expr::Not(Box::new(operand))
    ),
    |text| pcompare(text, depth)
  ))(text)
}

fn pcompare(text: &str, depth: usize) -> IResult<&str, Expr> {
  let (text, first) = pbitor(text, depth)?;
  let (text, rest)  = many0(pair(pcomparison, |text| pbitor(text, depth)))(text)?;
  match rest.is_empty() {
    true  => Ok((text, first)),
    false => Ok((text, Expr::Compare(Box::new(first), rest)))
  }
}

fn pcomparison(text: &str) -> IResult<&str, Comparison> {
  ptoken(map_res(
    alt((
      tag("=="), tag("!="), tag("<="), tag(">="),
      terminated(tag("<"), not(one_char('<'))),
      terminated(tag(">"), not(one_char('>')))
    )),
    Comparison::from_str
  ))(text)
}

// endregion

// region Arithmetic layer

fn pbitor(text: &str, depth: usize) -> IResult<&str, Expr> {
  let (text, first) = pbitxor(text, depth)?;
  let (text, rest)  = many0(pair(poperator(tag("|")), |text| pbitxor(text, depth)))(text)?;
  Ok((text, fold_binary(first, rest)))
}

fn pbitxor(text: &str, depth: usize) -> IResult<&str, Expr> {
  let (text, first) = pbitand(text, depth)?;
  let (text, rest)  = many0(pair(poperator(tag("^")), |text| pbitand(text, depth)))(text)?;
  Ok((text, fold_binary(first, rest)))
}

fn pbitand(text: &str, depth: usize) -> IResult<&str, Expr> {
  let (text, first) = pshift(text, depth)?;
  let (text, rest)  = many0(pair(
    poperator(terminated(tag("&"), not(satisfy(is_bit_name_char)))),
    |text| pshift(text, depth)
  ))(text)?;
  Ok((text, fold_binary(first, rest)))
}

fn pshift(text: &str, depth: usize) -> IResult<&str, Expr> {
  let (text, first) = psum(text, depth)?;
  let (text, rest)  = many0(pair(
    poperator(alt((tag("<<"), tag(">>")))),
    |text| psum(text, depth)
  ))(text)?;
  Ok((text, fold_binary(first, rest)))
}

fn psum(text: &str, depth: usize) -> IResult<&str, Expr> {
  let (text, first) = pterm(text, depth)?;
  let (text, rest)  = many0(pair(
    poperator(alt((tag("+"), tag("-")))),
    |text| pterm(text, depth)
  ))(text)?;
  Ok((text, fold_binary(first, rest)))
}

fn pterm(text: &str, depth: usize) -> IResult<&str, Expr> {
  let (text, first) = punary(text, depth)?;
  let (text, rest)  = many0(pair(
    poperator(alt((
      tag("//"),
      tag("%"),
      terminated(tag("*"), not(one_char('*')))
    ))),
    |text| punary(text, depth)
  ))(text)?;
  Ok((text, fold_binary(first, rest)))
}

fn punary(text: &str, depth: usize) -> IResult<&str, Expr> {
  check_nesting(text, depth)?;
  alt((
    map(
      pair(
        ptoken(alt((
          value(UnaryOp::Negate, one_char('-')),
          value(UnaryOp::Plus, one_char('+')),
          value(UnaryOp::Invert, one_char('~'))
        ))),
        |text| punary(text, depth + 1)
      ),
      |(op, operand)| Expr::Unary(op, Box::new(operand))
    ),
    |text| ppower(text, depth)
  ))(text)
}

/// `**` binds tighter than a unary operator on its left and looser than one on its right.
fn ppower(text: &str, depth: usize) -> IResult<&str, Expr> {
  let (text, base)     = patom(text, depth)?;
  let (text, exponent) = opt(preceded(ptoken(tag("**")), |text| punary(text, depth + 1)))(text)?;
  match exponent {
    Some(exponent) => Ok((text, Expr::Binary(BinaryOp::Power, Box::new(base), Box::new(exponent)))),
    None           => Ok((text, base))
  }
}

fn patom(text: &str, depth: usize) -> IResult<&str, Expr> {
  alt((
    map(ptoken(map_res(digit1, i64::from_str)), Expr::Integer),
    value(Expr::Integer(1), pkeyword("True")),
    value(Expr::Integer(0), pkeyword("False")),
    map(
      ptoken(preceded(one_char('&'), take_while1(is_bit_name_char))),
      |name: &str| Expr::Bit(name.to_string())
    ),
    delimited(ptoken(one_char('(')), |text| por(text, depth + 1), ptoken(one_char(')')))
  ))(text)
}

// endregion

// region Tokens

/// Skips leading whitespace, then applies `parser`.
fn ptoken<'a, O, P>(parser: P) -> impl FnMut(&'a str) -> IResult<&'a str, O>
  where P: FnMut(&'a str) -> IResult<&'a str, O>
{
  preceded(multispace0, parser)
}

fn poperator<'a, P>(parser: P) -> impl FnMut(&'a str) -> IResult<&'a str, BinaryOp>
  where P: FnMut(&'a str) -> IResult<&'a str, &'a str>
{
  ptoken(map_res(parser, BinaryOp::from_str))
}

/// A keyword must not run on into a longer word: `nothing` is not `not` followed by `hing`.
fn pkeyword<'a>(keyword: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
  ptoken(terminated(tag(keyword), not(satisfy(is_word_char))))
}

// endregion


#[cfg(test)]
mod tests {
  use super::*;

  fn shape(text: &str) -> String {
    parse_condition(text).map(|expr| expr.to_string()).unwrap_or_else(|_| "error".to_string())
  }

  #[test]
  fn precedence(){
    assert_eq!(shape("1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(shape("(1 + 2) * 3"), "((1 + 2) * 3)");
    assert_eq!(shape("-2 ** 2"), "(-(2 ** 2))");
    assert_eq!(shape("2 ** -1"), "(2 ** (-1))");
    assert_eq!(shape("1 | 2 ^ 3 & 4"), "(1 | (2 ^ (3 & 4)))");
    assert_eq!(shape("1 << 2 + 3"), "(1 << (2 + 3))");
    assert_eq!(shape("8 // 2 % 3"), "((8 // 2) % 3)");
  }

  #[test]
  fn boolean_layer(){
    assert_eq!(shape("not 1 == 2"), "(not (1 == 2))");
    assert_eq!(shape("1 or 0 and 0"), "(1 or (0 and 0))");
    assert_eq!(shape("not not True"), "(not (not 1))");
    assert_eq!(shape("1 < 2 <= 3"), "(1 < 2 <= 3)");
  }

  #[test]
  fn bit_references(){
    assert_eq!(shape("&a == 1"), "(&a == 1)");
    assert_eq!(shape("&byte[3]&&1x0001C"), "(&byte[3] & &1x0001C)");
    assert_eq!(shape("&a & 1"), "(&a & 1)");
    assert_eq!(shape("& a"), "error");
  }

  #[test]
  fn rejects_malformed_text(){
    assert_eq!(shape(""), "error");
    assert_eq!(shape("1 +"), "error");
    assert_eq!(shape("(1"), "error");
    assert_eq!(shape("1 2"), "error");
    assert_eq!(shape("nothing"), "error");
    assert_eq!(shape("&a &b"), "error");
    assert_eq!(shape("1 / 2"), "error");
  }

  #[test]
  fn nesting_is_bounded(){
    let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(shape(&nested(3)), "1");
    assert!(parse_condition(&nested(MAX_NESTING / 2)).is_ok());
    assert_eq!(shape(&nested(MAX_NESTING + 1)), "error");
    assert_eq!(shape(&nested(5000)), "error");
    assert_eq!(shape(&format!("{}1", "-".repeat(MAX_NESTING - 1))), "(-".repeat(MAX_NESTING - 1) + "1" + &")".repeat(MAX_NESTING - 1));
    assert_eq!(shape(&format!("{}1", "-".repeat(MAX_NESTING + 1))), "error");
    assert_eq!(shape(&format!("{}1", "not ".repeat(MAX_NESTING + 1))), "error");
  }

  #[test]
  fn length_is_bounded(){
    let chain = |terms: usize| vec!["1"; terms].join("+");
    assert!(parse_condition(&chain(MAX_CONDITION_LENGTH / 2)).is_ok());
    assert_eq!(shape(&chain(MAX_CONDITION_LENGTH)), "error");
    assert_eq!(shape(&chain(200_000)), "error");
  }

  #[test]
  fn whitespace_is_free(){
    assert_eq!(shape("  ( &a+1 )  ==2 "), "((&a + 1) == 2)");
  }
}
