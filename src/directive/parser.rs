/*!
  Parses a single comment-stripped line into a `Directive`.

  The grammar, per mnemonic:
    ```text
    mov    <bit> ':' <bit> ';'
    swc    <bit> ':' <bit> ';'
    slp    [0-9.]+ ';'          |  [0-9]+ ';'
    call   <word> ';'
    ret;                                          (surrounding whitespace allowed)
    cln    <condition> ':'                        (up to the end of the line)
    out    '$' <text> '$;'      |  '&' <bit> ';'  |  '&(' <bit> ');'
    set    <bit> ':' ' '* [01] ';'
    pop    <bit> ';'
    rev    <bit> ';'
    sft    <word> '[' <int> ':' <int> ']' ' '* ':' ' '* '-'? <int> ';'
    goto   <int> ';'
    rel    'bit' ' '* ':' ' '* <word> ' '* '=' ' '* [01] ';'
    rel    'byt' ' '* ':' ' '* <word> '[' <int> ':' <int> ']'
    con    <bit> '~' ' '* 'gate:' <word> '(' <bit> (',' <bit>)* ');'
    bdl    <word> (';' | ':')
    ```
  where `<bit>` is any text up to the next delimiter, trimmed, and `<word>` is letters, digits and
  underscores. A line beginning with `;` is a nested line of a conditional block.
*/

use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::{take_till1, take_until, take_while, take_while1, tag},
  character::complete::{alpha1, char as one_char, digit1, one_of},
  combinator::{map, map_res, opt, recognize, verify},
  sequence::{pair, preceded, separated_pair, terminated, tuple},
  IResult
};

use crate::address::is_word_char;
use crate::labels::label_definition;
use crate::program::NESTED_PREFIX;
use super::syntax::{Directive, Mnemonic, Pause};

/// Parses one line. Never fails: anything unrecognised is `Directive::Skip`.
pub fn parse_directive(line: &str) -> Directive<'_> {
  if let Some(body) = line.strip_prefix(NESTED_PREFIX) {
    return Directive::Nested(body);
  }
  if line.trim() == "ret;" {
    return Directive::Return;
  }
  if let Some(condition) = line.strip_prefix("cln ").and_then(|rest| rest.strip_suffix(':')) {
    return Directive::Conditional(condition.trim());
  }
  if line.starts_with("out $") && line.ends_with("$;") {
    // In "out $;" the two dollar signs are the same character.
    let text = line.get(5..line.len() - 2).unwrap_or("");
    return Directive::PrintText(text);
  }
  if let Some(bit) = line.strip_prefix("out &").and_then(|rest| rest.strip_suffix(';')) {
    let bit = bit.trim();
    let bit =
      match bit.strip_prefix('(').and_then(|inner| inner.strip_suffix(')')) {
        Some(inner) => inner.trim(),
        None        => bit
      };
    return Directive::PrintBit(bit);
  }
  if let Some(label) = label_definition(line) {
    return Directive::Label(label);
  }

  match pmnemonic(line) {
    Ok((operands, mnemonic)) => {
      poperands(mnemonic, operands)
        .map(|(_rest, directive)| directive)
        .unwrap_or(Directive::Skip)
    }
    Err(_) => Directive::Skip
  }
}

/// <mnemonic> ' '
fn pmnemonic(text: &str) -> IResult<&str, Mnemonic> {
  map_res(terminated(alpha1, one_char(' ')), Mnemonic::from_str)(text)
}

fn poperands(mnemonic: Mnemonic, text: &str) -> IResult<&str, Directive<'_>> {
  match mnemonic {

    Mnemonic::Mov => {
      map(pbit_pair, |(source, destination)| Directive::Move{ source, destination })(text)
    }

    Mnemonic::Swc => map(pbit_pair, |(a, b)| Directive::Swap(a, b))(text),

    Mnemonic::Slp => {
      // The millisecond form only matches text the seconds form already accepts, so it is
      // never reached.
      map(
        alt((
          map(terminated(take_while1(|c: char| c.is_ascii_digit() || c == '.'), one_char(';')), Pause::Seconds),
          map(terminated(digit1, one_char(';')), Pause::Millis)
        )),
        Directive::Sleep
      )(text)
    }

    Mnemonic::Call => map(terminated(pword, one_char(';')), Directive::Call)(text),

    Mnemonic::Set => {
      map(
        tuple((
          pbit_until(':'),
          one_char(':'),
          pspaces,
          pflag,
          one_char(';')
        )),
        |(bit, _, _, value, _)| Directive::Set{ bit, value }
      )(text)
    }

    Mnemonic::Pop => map(pbit_statement, Directive::Pop)(text),

    Mnemonic::Rev => map(pbit_statement, Directive::Reverse)(text),

    Mnemonic::Sft => {
      map(
        tuple((
          pword,
          prange,
          pspaces, one_char(':'), pspaces,
          psigned,
          one_char(';')
        )),
        |(group, (start, end), _, _, _, amount, _)| Directive::Shift{ group, start, end, amount }
      )(text)
    }

    Mnemonic::Goto => map(terminated(pnumber, one_char(';')), Directive::Goto)(text),

    Mnemonic::Rel => alt((pdeclare_bit, pdeclare_byte))(text),

    Mnemonic::Con => pconnect(text),

    // These have whole-line forms handled by `parse_directive`.
    Mnemonic::Ret
    | Mnemonic::Cln
    | Mnemonic::Out
    | Mnemonic::Bdl => Ok((text, Directive::Skip)),

  }
}

/// 'bit' ' '* ':' ' '* <word> ' '* '=' ' '* [01] ';'
fn pdeclare_bit(text: &str) -> IResult<&str, Directive<'_>> {
  map(
    tuple((
      tag("bit"), pspaces, one_char(':'), pspaces,
      pword,
      pspaces, one_char('='), pspaces,
      pflag,
      one_char(';')
    )),
    |(_, _, _, _, name, _, _, _, value, _)| Directive::DeclareBit{ name, value }
  )(text)
}

/// 'byt' ' '* ':' ' '* <word> '[' <int> ':' <int> ']'
fn pdeclare_byte(text: &str) -> IResult<&str, Directive<'_>> {
  map(
    tuple((
      tag("byt"), pspaces, one_char(':'), pspaces,
      pword,
      prange
    )),
    |(_, _, _, _, name, (start, end))| Directive::DeclareByte{ name, start, end }
  )(text)
}

/// <bit> '~' ' '* 'gate:' <word> '(' <inputs> ');'
fn pconnect(text: &str) -> IResult<&str, Directive<'_>> {
  map(
    tuple((
      pbit_until('~'),
      one_char('~'),
      pspaces,
      preceded(tag("gate:"), pword),
      one_char('('),
      verify(take_until(");"), |inputs: &str| !inputs.is_empty()),
      tag(");")
    )),
    |(output, _, _, gate, _, inputs, _)| Directive::Connect{
      output,
      gate,
      inputs: inputs.split(',').map(str::trim).collect()
    }
  )(text)
}

// region Terminals

/// <bit> ':' <bit> ';'
fn pbit_pair(text: &str) -> IResult<&str, (&str, &str)> {
  separated_pair(pbit_until(':'), one_char(':'), pbit_statement)(text)
}

/// <bit> ';'
fn pbit_statement(text: &str) -> IResult<&str, &str> {
  terminated(pbit_until(';'), one_char(';'))(text)
}

/// Non-empty text up to `delimiter`, trimmed. Trimming may leave it empty, which the bit store
/// rejects when the name is used.
fn pbit_until<'a>(delimiter: char) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
  map(take_till1(move |c: char| c == delimiter), str::trim)
}

/// '[' <int> ':' <int> ']'
fn prange(text: &str) -> IResult<&str, (usize, usize)> {
  map(
    tuple((one_char('['), pnumber, one_char(':'), pnumber, one_char(']'))),
    |(_, start, _, end, _)| (start, end)
  )(text)
}

fn pword(text: &str) -> IResult<&str, &str> {
  take_while1(is_word_char)(text)
}

fn pnumber(text: &str) -> IResult<&str, usize> {
  map_res(digit1, str::parse::<usize>)(text)
}

fn psigned(text: &str) -> IResult<&str, i64> {
  map_res(recognize(pair(opt(one_char('-')), digit1)), str::parse::<i64>)(text)
}

/// [01]
fn pflag(text: &str) -> IResult<&str, bool> {
  map(one_of("01"), |flag| flag == '1')(text)
}

/// ' '*
fn pspaces(text: &str) -> IResult<&str, &str> {
  take_while(|c: char| c == ' ')(text)
}

// endregion


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn moves_and_swaps(){
    assert_eq!(
      parse_directive("mov a : b;"),
      Directive::Move{ source: "a", destination: "b" }
    );
    assert_eq!(
      parse_directive("mov byte[0]:1x0001;"),
      Directive::Move{ source: "byte[0]", destination: "1x0001" }
    );
    assert_eq!(parse_directive("swc x:y; trailing"), Directive::Swap("x", "y"));
    assert_eq!(parse_directive("mov a b;"), Directive::Skip);
    // A blank destination parses; the store rejects it when the line runs.
    assert_eq!(parse_directive("mov a: ;"), Directive::Move{ source: "a", destination: "" });
  }

  #[test]
  fn sleeps_take_the_seconds_form_first(){
    assert_eq!(parse_directive("slp 0.5;"), Directive::Sleep(Pause::Seconds("0.5")));
    assert_eq!(parse_directive("slp 250;"), Directive::Sleep(Pause::Seconds("250")));
    assert_eq!(parse_directive("slp 1.2.3;"), Directive::Sleep(Pause::Seconds("1.2.3")));
    assert_eq!(parse_directive("slp -1;"), Directive::Skip);
  }

  #[test]
  fn control_flow(){
    assert_eq!(parse_directive("call sub_1;"), Directive::Call("sub_1"));
    assert_eq!(parse_directive("call sub 1;"), Directive::Skip);
    assert_eq!(parse_directive("ret;"), Directive::Return);
    assert_eq!(parse_directive("   ret;"), Directive::Return);
    assert_eq!(parse_directive("ret ;"), Directive::Skip);
    assert_eq!(parse_directive("goto 12;"), Directive::Goto(12));
    assert_eq!(parse_directive("goto -1;"), Directive::Skip);
    assert_eq!(parse_directive("bdl loop;"), Directive::Label("loop"));
  }

  #[test]
  fn conditionals_and_nesting(){
    assert_eq!(parse_directive("cln &a == 1 :"), Directive::Conditional("&a == 1"));
    assert_eq!(parse_directive("cln &a == 1"), Directive::Skip);
    assert_eq!(parse_directive(";set a : 1;"), Directive::Nested("set a : 1;"));
  }

  #[test]
  fn output(){
    assert_eq!(parse_directive("out $Hello, world$;"), Directive::PrintText("Hello, world"));
    assert_eq!(parse_directive("out $;"), Directive::PrintText(""));
    assert_eq!(parse_directive("out &carry;"), Directive::PrintBit("carry"));
    assert_eq!(parse_directive("out &( byte[2] );"), Directive::PrintBit("byte[2]"));
    assert_eq!(parse_directive("out $unterminated"), Directive::Skip);
  }

  #[test]
  fn bit_writes(){
    assert_eq!(parse_directive("set a : 1;"), Directive::Set{ bit: "a", value: true });
    assert_eq!(parse_directive("set a:0;"), Directive::Set{ bit: "a", value: false });
    assert_eq!(parse_directive("set a : 2;"), Directive::Skip);
    assert_eq!(parse_directive("pop a ;"), Directive::Pop("a"));
    assert_eq!(parse_directive("rev 1x0002;"), Directive::Reverse("1x0002"));
  }

  #[test]
  fn shifts(){
    assert_eq!(
      parse_directive("sft byte[0:7] : -2;"),
      Directive::Shift{ group: "byte", start: 0, end: 7, amount: -2 }
    );
    assert_eq!(
      parse_directive("sft 1x[1:4]:1;"),
      Directive::Shift{ group: "1x", start: 1, end: 4, amount: 1 }
    );
    assert_eq!(parse_directive("sft byte[0:7];"), Directive::Skip);
  }

  #[test]
  fn declarations(){
    assert_eq!(parse_directive("rel bit: a = 1;"), Directive::DeclareBit{ name: "a", value: true });
    assert_eq!(parse_directive("rel bit : a=0;"), Directive::DeclareBit{ name: "a", value: false });
    assert_eq!(
      parse_directive("rel byt: byte[0:7]"),
      Directive::DeclareByte{ name: "byte", start: 0, end: 7 }
    );
    assert_eq!(
      parse_directive("rel byt : byte[2:3];"),
      Directive::DeclareByte{ name: "byte", start: 2, end: 3 }
    );
    assert_eq!(parse_directive("rel  bit: a = 1;"), Directive::Skip);
    assert_eq!(parse_directive("rel bit: a b = 1;"), Directive::Skip);
  }

  #[test]
  fn connections(){
    assert_eq!(
      parse_directive("con c ~ gate:AND(a, b);"),
      Directive::Connect{ output: "c", gate: "AND", inputs: vec!["a", "b"] }
    );
    assert_eq!(
      parse_directive("con out~gate:NOT(1x0001C);"),
      Directive::Connect{ output: "out", gate: "NOT", inputs: vec!["1x0001C"] }
    );
    assert_eq!(
      parse_directive("con c ~ gate:OR(a,,b);"),
      Directive::Connect{ output: "c", gate: "OR", inputs: vec!["a", "", "b"] }
    );
    assert_eq!(parse_directive("con c ~ gate:AND();"), Directive::Skip);
    assert_eq!(parse_directive("con c ~ AND(a, b);"), Directive::Skip);
  }

  #[test]
  fn unrecognised_lines(){
    assert_eq!(parse_directive(""), Directive::Skip);
    assert_eq!(parse_directive("  mov a : b;"), Directive::Skip);
    assert_eq!(parse_directive("jmp 3;"), Directive::Skip);
    assert_eq!(parse_directive("just some prose"), Directive::Skip);
  }
}
