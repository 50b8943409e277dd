//! The execution engine. A `Machine` owns every table a run needs and walks the program one line
//! at a time, writing `out` output and failure reports to its output sink.

use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::thread;

use prettytable::{format as TableFormat, Table};

use crate::condition::resolve_condition;
use crate::directive::{parse_directive, Directive};
use crate::error::{ExecError, ExecResult};
use crate::gate::{Connection, Gate, GateKind};
use crate::labels::LabelIndex;
use crate::program::{strip_comment, Program};
use crate::store::BitStore;

/// Where control goes after a line has been dispatched.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Flow {
  Next,
  /// A 0-based line index.
  Jump(usize),
}

pub struct Machine<'p, W: Write> {
  program    : &'p Program,
  labels     : LabelIndex,
  store      : BitStore,
  call_stack : Vec<usize>, // Lines that executed a `call`
  pc         : usize,
  out        : W,
}

impl<'p, W: Write> Machine<'p, W> {

  pub fn new(program: &'p Program, out: W) -> Machine<'p, W> {
    Machine{
      program,
      labels     : LabelIndex::scan(program),
      store      : BitStore::new(),
      call_stack : Vec::new(),
      pc         : 0,
      out,
    }
  }

  // region Accessors

  pub fn pc(&self) -> usize {
    self.pc
  }

  pub fn is_halted(&self) -> bool {
    self.pc >= self.program.len()
  }

  pub fn store(&self) -> &BitStore {
    &self.store
  }

  pub fn store_mut(&mut self) -> &mut BitStore {
    &mut self.store
  }

  pub fn labels(&self) -> &LabelIndex {
    &self.labels
  }

  pub fn call_stack(&self) -> &[usize] {
    &self.call_stack
  }

  pub fn output(&self) -> &W {
    &self.out
  }

  pub fn into_output(self) -> W {
    self.out
  }

  // endregion

  // region Execution

  /// Runs until the program counter leaves the program. Only a failing output sink stops a run early.
  pub fn run(&mut self) -> io::Result<()> {
    while !self.is_halted() {
      self.step()?;
    }
    self.out.flush()
  }

  /// Dispatches the line at the program counter and moves the counter. Does nothing once halted.
  pub fn step(&mut self) -> io::Result<()> {
    let program = self.program;
    let line =
      match program.line(self.pc) {
        Some(line) => strip_comment(line),
        None       => return Ok(())
      };

    let directive = parse_directive(line);

    #[cfg(feature = "trace_execution")]
    eprintln!("[{:>4}] {}", self.pc + 1, directive);

    let flow =
      match self.dispatch(directive) {
        Ok(flow)                  => flow,
        Err(ExecError::Io(error)) => return Err(error),
        Err(error)                => {
          self.report(&error, self.pc)?;
          Flow::Next
        }
      };

    self.pc =
      match flow {
        Flow::Next         => self.pc + 1,
        Flow::Jump(target) => target
      };

    #[cfg(feature = "trace_execution")]
    eprintln!("{}", self);

    Ok(())
  }

  fn dispatch(&mut self, directive: Directive<'_>) -> ExecResult<Flow> {
    match directive {

      Directive::Move{ source, destination } => {
        let source      = self.store.find_or_create(source)?;
        let destination = self.store.find_or_create(destination)?;
        let value = self.store.value(source);
        self.store.set(destination, value);
        self.store.set(source, false);
      }

      Directive::Swap(a, b) => {
        let a = self.store.find_or_create(a)?;
        let b = self.store.find_or_create(b)?;
        self.store.swap(a, b);
      }

      Directive::Sleep(pause) => thread::sleep(pause.duration()?),

      Directive::Call(label) => {
        if let Some(target) = self.labels.line_of(label) {
          self.call_stack.push(self.pc);
          return Ok(Flow::Jump(target));
        }
      }

      Directive::Return => {
        if let Some(caller) = self.call_stack.pop() {
          return Ok(Flow::Jump(caller + 1));
        }
      }

      Directive::Conditional(condition) => return self.run_block(condition),

      Directive::PrintText(text) => writeln!(self.out, "{}", text)?,

      Directive::PrintBit(name) => {
        let bit = self.store.find_or_create(name)?;
        writeln!(self.out, "{}", self.store.value(bit) as u8)?;
      }

      Directive::Set{ bit, value } => {
        let bit = self.store.find_or_create(bit)?;
        self.store.set(bit, value);
      }

      Directive::Pop(bit) => {
        let bit = self.store.find_or_create(bit)?;
        self.store.set(bit, false);
      }

      Directive::Reverse(bit) => {
        let bit = self.store.find_or_create(bit)?;
        self.store.toggle(bit);
      }

      Directive::Shift{ group, start, end, amount } => self.store.shift(group, start, end, amount)?,

      Directive::Goto(0)    => return Err(ExecError::InvalidJumpTarget(0)),
      Directive::Goto(line) => return Ok(Flow::Jump(line - 1)),

      Directive::DeclareBit{ name, value } => {
        self.store.declare_bit(name, value);
      }

      Directive::DeclareByte{ name, start, end } => self.store.declare_group(name, start, end),

      Directive::Connect{ output, gate, inputs } => {
        let output = self.store.find_or_create(output)?;
        let inputs =
          inputs
            .into_iter()
            .map(|input| self.store.find_or_create(input))
            .collect::<ExecResult<Vec<_>>>()?;
        let kind = GateKind::from_name(gate)?;
        Connection::new(output, Gate::new(kind, inputs)).latch(&mut self.store)?;
      }

      Directive::Label(_)
      | Directive::Nested(_)
      | Directive::Skip => {}

    }
    Ok(Flow::Next)
  }

  /**
    Runs the nested lines below the `cln` line at the program counter if `condition` holds. Each
    nested line fails on its own, and its report carries the number of the failing `;` line, not
    the number of the `cln` line. The first nested jump ends the block and becomes the outcome of
    the `cln` line.
  */
  fn run_block(&mut self, condition: &str) -> ExecResult<Flow> {
    if !resolve_condition(condition, &self.store) {
      return Ok(Flow::Next);
    }

    let program = self.program;
    let mut index = self.pc + 1;
    while let Some(body) = program.nested_body(index) {
      let outcome =
        match parse_directive(body) {
          Directive::Conditional(_) => Err(ExecError::NestedConditional),
          directive                 => self.dispatch(directive)
        };
      match outcome {
        Ok(Flow::Next)            => {}
        Ok(jump)                  => return Ok(jump),
        Err(ExecError::Io(error)) => return Err(ExecError::Io(error)),
        Err(error)                => self.report(&error, index)?,
      }
      index += 1;
    }
    Ok(Flow::Next)
  }

  /// Writes `[Syn] (KIND) : MESSAGE [line N]` for the 0-based line index `line`.
  fn report(&mut self, error: &ExecError, line: usize) -> io::Result<()> {
    writeln!(self.out, "[Syn] ({}) : {} [line {}]", error.kind(), error, line + 1)
  }

  // endregion

  // region Display methods

  fn make_call_stack_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Caller", ubl->"In label"]);

    for (depth, caller) in self.call_stack.iter().enumerate().rev() {
      let label =
        (0..=*caller)
          .rev()
          .find_map(|line| self.labels.label_at(line))
          .map_or_else(String::new, |name| name.to_string());
      match depth + 1 == self.call_stack.len() {
        true  => table.add_row(row![r->format!("* --> line {}", caller + 1), label]),
        false => table.add_row(row![r->format!("line {}", caller + 1), label]),
      };
    }
    table
  }

  fn make_bit_table(&self) -> Table {
    let mut table = Table::new();
    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Name", ubl->"Value"]);

    for (name, bit) in self.store.user_bits() {
      table.add_row(row![r->format!("{} =", name), bit.value() as u8]);
    }
    table
  }

  // endregion
}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl<'p, W: Write> Display for Machine<'p, W> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let stack_table = self.make_call_stack_table();
    let bit_table   = self.make_bit_table();

    let mut combined_table = table!([stack_table, bit_table]);
    combined_table.set_titles(row![ub->"Call Stack", ub->"User Bits"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let status = match self.is_halted() {
      true  => "halted",
      false => "running"
    };

    write!(f, "pc: {} ({})\n{}", self.pc + 1, status, combined_table)
  }
}
