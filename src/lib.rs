/*!
  An interpreter for Syn, a line-oriented scripting language over bits, byte groups and logic gates.

  A script is loaded into a `Program`, and a `Machine` runs it line by line, writing `out` output and
  per-line failure reports to any `io::Write` sink.

  Enabling the `trace_execution` feature prints each dispatched line and the machine state to stderr.
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bit;
pub mod condition;
pub mod directive;
pub mod error;
pub mod gate;
pub mod labels;
pub mod machine;
pub mod program;
pub mod store;

pub use error::{ExecError, ExecResult};
pub use machine::{Flow, Machine};
pub use program::Program;
