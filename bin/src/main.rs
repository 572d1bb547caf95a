use std::{
    io::{stdin, stdout, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use errors::{Reporter, RloxError};
use interpreter::{InterpretError, Interpreter};

#[derive(clap::Parser)]
#[command(about = "Tree-walking interpreter for Lox")]
struct Args {
    /// Script to run. Starts an interactive prompt when omitted.
    script: Option<PathBuf>,
}

const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;

/// Prints diagnostics to stderr as they come in.
#[derive(Default)]
struct ConsoleReporter {
    had_error: bool,
    had_runtime_error: bool,
}

impl Reporter for ConsoleReporter {
    fn error(&mut self, error: RloxError) {
        eprintln!("{}", error);
        self.had_error = true;
    }

    fn runtime_error(&mut self, error: RloxError) {
        eprintln!("{}\n[line {}]", error.message, error.line);
        self.had_runtime_error = true;
    }

    fn had_error(&self) -> bool {
        self.had_error
    }

    fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    fn reset(&mut self) {
        self.had_error = false;
    }
}

fn run_file(path: PathBuf, interpreter: &mut Interpreter<std::io::Stdout>) -> anyhow::Result<ExitCode> {
    let source = std::fs::read_to_string(&path)?;
    let mut reporter = ConsoleReporter::default();

    match interpreter.run_source(&source, &mut reporter) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(InterpretError::SyntaxError(_)) => Ok(ExitCode::from(EX_DATAERR)),
        Err(InterpretError::RuntimeError(_)) => Ok(ExitCode::from(EX_SOFTWARE)),
    }
}

fn run_prompt(interpreter: &mut Interpreter<std::io::Stdout>) -> anyhow::Result<ExitCode> {
    let mut reporter = ConsoleReporter::default();
    loop {
        print!("> ");
        stdout().flush()?;

        let mut line = String::new();
        if stdin().read_line(&mut line)? == 0 {
            println!();
            return Ok(ExitCode::SUCCESS);
        }

        // Errors were already printed by the reporter.
        if let Err(e) = interpreter.run_source(&line, &mut reporter) {
            log::debug!("Line failed: {:?}", e);
        }
        interpreter.output().lock().flush()?;
        reporter.reset();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            eprint!("{}", e);
            return Ok(ExitCode::from(EX_USAGE));
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    let mut interpreter = Interpreter::default();

    match args.script {
        Some(script) => run_file(script, &mut interpreter),
        None => run_prompt(&mut interpreter),
    }
}
