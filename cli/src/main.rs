use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use ippcode::{Error, Input, Isolate, Program};

/// IPPcode22 interpreter.
///
/// Executes a program XML document. At least one of --source and --input must
/// be given; whichever is missing is read from the standard input.
#[derive(Debug, Parser)]
#[clap(name = "ippcode", version)]
struct App {
  /// Path to the program XML document.
  #[clap(long, value_name = "PATH")]
  source: Option<PathBuf>,
  /// Path to the input consumed by READ.
  #[clap(long, value_name = "PATH")]
  input: Option<PathBuf>,
}

fn main() -> ExitCode {
  let app = match App::try_parse() {
    Ok(app) => app,
    Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
      let _ = e.print();
      return ExitCode::SUCCESS;
    }
    Err(e) => {
      let _ = e.print();
      return exit_code(ippcode::ErrorKind::CliArg.code());
    }
  };

  match run(app) {
    Ok(code) => exit_code(code),
    Err(e) => {
      eprintln!("ERROR: {e}");
      exit_code(e.code())
    }
  }
}

fn run(app: App) -> ippcode::Result<i32> {
  if app.source.is_none() && app.input.is_none() {
    return Err(Error::cli_arg(
      "Either a source or an input file must be given",
    ));
  }

  let program = load(app.source.as_deref())?;

  let input: Box<dyn Input> = match &app.input {
    Some(path) => Box::new(BufReader::new(open(path)?)),
    None => Box::new(BufReader::new(io::stdin())),
  };

  let mut isolate = Isolate::with_io(program, input, io::stdout(), io::stderr());
  isolate.run()
}

fn load(source: Option<&Path>) -> ippcode::Result<Program> {
  match source {
    Some(path) => ippcode::load(BufReader::new(open(path)?)),
    None => ippcode::load(io::stdin().lock()),
  }
}

fn open(path: &Path) -> ippcode::Result<File> {
  File::open(path).map_err(|_| Error::file(format!("Cannot access file {}", path.display())))
}

fn exit_code(code: i32) -> ExitCode {
  ExitCode::from(code as u8)
}
