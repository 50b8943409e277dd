use std::fmt::{Display, Formatter};
use std::time::Duration;

use strum_macros::{Display as StrumDisplay, EnumString, IntoStaticStr};

use crate::error::{ExecError, ExecResult};

/// Mnemonics of the directive set, as they are spelled in source.
#[derive(
StrumDisplay, EnumString, IntoStaticStr,
Clone,        Copy,       Eq, PartialEq, Debug, Hash
)]
#[strum(serialize_all = "lowercase")]
pub enum Mnemonic {
  Mov,  // mov SRC : DST;
  Swc,  // swc A : B;
  Slp,  // slp SECONDS;
  Call, // call LABEL;
  Ret,  // ret;
  Cln,  // cln CONDITION:
  Out,  // out $TEXT$;   out &BIT;
  Set,  // set BIT : 0|1;
  Pop,  // pop BIT;
  Rev,  // rev BIT;
  Sft,  // sft GROUP[start:end] : shift;
  Goto, // goto LINE;
  Rel,  // rel bit : NAME = 0|1;   rel byt : NAME[start:end]
  Con,  // con OUT ~ gate:KIND(IN, ...);
  Bdl,  // bdl LABEL;
}

/// The operand of `slp`. Both forms are written as bare numbers; the fractional-seconds form is
/// tried first and so shadows the millisecond form.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Pause<'a> {
  Seconds(&'a str),
  Millis(&'a str)
}

impl<'a> Pause<'a> {
  pub fn duration(&self) -> ExecResult<Duration> {
    match self {

      Pause::Seconds(text) => {
        let seconds = text.parse::<f64>().map_err(|_| ExecError::InvalidNumber(text.to_string()))?;
        Duration::try_from_secs_f64(seconds).map_err(|_| ExecError::InvalidNumber(text.to_string()))
      }

      Pause::Millis(text) => {
        let millis = text.parse::<u64>().map_err(|_| ExecError::InvalidNumber(text.to_string()))?;
        Ok(Duration::from_millis(millis))
      }

    }
  }
}

/// One parsed line. Bit, group and label names are trimmed slices of the line.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Directive<'a> {
  Move {
    source      : &'a str,
    destination : &'a str
  },
  Swap(&'a str, &'a str),
  Sleep(Pause<'a>),
  Call(&'a str),
  Return,
  /// Holds the condition text.
  Conditional(&'a str),
  PrintText(&'a str),
  PrintBit(&'a str),
  Set {
    bit   : &'a str,
    value : bool
  },
  Pop(&'a str),
  Reverse(&'a str),
  Shift {
    group  : &'a str,
    start  : usize,
    end    : usize,
    amount : i64
  },
  /// The 1-based target line as written.
  Goto(usize),
  DeclareBit {
    name  : &'a str,
    value : bool
  },
  DeclareByte {
    name  : &'a str,
    start : usize,
    end   : usize
  },
  /// The gate kind stays textual until the directive runs, after its bits have been resolved.
  Connect {
    output : &'a str,
    gate   : &'a str,
    inputs : Vec<&'a str>
  },
  Label(&'a str),
  /// A line of a conditional block, reached outside of its block. Holds the text after the prefix.
  Nested(&'a str),
  /// Blank lines, prose and malformed directives.
  Skip,
}

/// Canonical source text of the directive. `Skip` prints nothing.
impl<'a> Display for Directive<'a> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Directive::Move{ source, destination } => {
        write!(f, "mov {} : {};", source, destination)
      }

      Directive::Swap(a, b) => write!(f, "swc {} : {};", a, b),

      Directive::Sleep(Pause::Seconds(text))
      | Directive::Sleep(Pause::Millis(text)) => write!(f, "slp {};", text),

      Directive::Call(label) => write!(f, "call {};", label),

      Directive::Return => write!(f, "ret;"),

      Directive::Conditional(condition) => write!(f, "cln {}:", condition),

      Directive::PrintText(text) => write!(f, "out ${}$;", text),

      Directive::PrintBit(bit) => write!(f, "out &{};", bit),

      Directive::Set{ bit, value } => write!(f, "set {} : {};", bit, *value as u8),

      Directive::Pop(bit) => write!(f, "pop {};", bit),

      Directive::Reverse(bit) => write!(f, "rev {};", bit),

      Directive::Shift{ group, start, end, amount } => {
        write!(f, "sft {}[{}:{}] : {};", group, start, end, amount)
      }

      Directive::Goto(line) => write!(f, "goto {};", line),

      Directive::DeclareBit{ name, value } => write!(f, "rel bit : {} = {};", name, *value as u8),

      Directive::DeclareByte{ name, start, end } => write!(f, "rel byt : {}[{}:{}]", name, start, end),

      Directive::Connect{ output, gate, inputs } => {
        write!(f, "con {} ~ gate:{}({});", output, gate, inputs.join(", "))
      }

      Directive::Label(label) => write!(f, "bdl {};", label),

      Directive::Nested(body) => write!(f, ";{}", body),

      Directive::Skip => Ok(()),

    }
  }
}
