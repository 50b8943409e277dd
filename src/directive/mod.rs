/*!
  Directives are the instructions of a Syn program, one per line. A visited line is parsed into a
  typed `Directive` every time control reaches it; nothing is compiled ahead of time.

  Recognition follows the surface syntax closely. Each directive is introduced by a three or four
  letter mnemonic followed by a space, and the rest of the line must match that directive's
  grammar. A line whose mnemonic is known but whose operands don't match is skipped without a
  report, exactly like a blank line or prose.

  Operand names are borrowed from the line, so a `Directive` lives no longer than the text it was
  parsed from.
*/

mod parser;
mod syntax;

pub use parser::parse_directive;
pub use syntax::{Directive, Mnemonic, Pause};
