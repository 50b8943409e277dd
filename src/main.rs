use std::io;
use std::process::ExitCode;

use clap::Parser;

use syn_lang::{Machine, Program};

/// Runs a Syn script.
#[derive(Parser, Debug)]
#[command(name = "syn", version, about, long_about = None)]
struct Args {
  /// The script to run.
  #[arg(default_value = "script.syn")]
  script: String,
}

fn main() -> ExitCode {
  let args = Args::parse();

  let program = match Program::load(&args.script) {
    Ok(program) => program,
    Err(_) => {
      println!("file not found: {}", args.script);
      return ExitCode::FAILURE;
    }
  };

  #[cfg(feature = "trace_execution")]
  eprintln!("Execution tracing ENABLED");

  println!("[syn {}] file : {} loading completed...", env!("CARGO_PKG_VERSION"), args.script);

  let mut machine = Machine::new(&program, io::stdout().lock());
  if let Err(e) = machine.run() {
    eprintln!("{e}");
    return ExitCode::FAILURE;
  }
  ExitCode::SUCCESS
}
