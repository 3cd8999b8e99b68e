use std::error::Error as StdError;
use std::fmt::Display;

use beef::lean::Cow;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// An interpretation failure.
///
/// Every error carries the [`ErrorKind`] that decides the process exit code
/// and a human-readable message. The first error aborts execution; nothing is
/// recovered inside the engine.
#[derive(Debug)]
pub struct Error {
  kind: ErrorKind,
  message: Cow<'static, str>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
  /// Invalid or missing CLI argument.
  CliArg,
  /// Cannot access a source, input, or output stream.
  File,
  /// XML is not well-formed.
  XmlFormat,
  /// Bad XML structure.
  XmlStruct,
  /// Duplicate label, unknown label, or variable redefinition.
  Semantic,
  /// Operand kinds do not match an opcode's contract.
  Type,
  /// Variable lookup missed in an existing frame.
  NoVar,
  /// Operation requires a frame that is absent.
  NoFrame,
  /// Read of an uninitialized variable or pop from an empty stack.
  NoValue,
  /// Invalid operand value.
  InvValue,
  /// String operation out of range.
  Str,
}

impl ErrorKind {
  /// The process exit code reported for this kind.
  pub fn code(self) -> i32 {
    match self {
      ErrorKind::CliArg => 10,
      ErrorKind::File => 11,
      ErrorKind::XmlFormat => 31,
      ErrorKind::XmlStruct => 32,
      ErrorKind::Semantic => 52,
      ErrorKind::Type => 53,
      ErrorKind::NoVar => 54,
      ErrorKind::NoFrame => 55,
      ErrorKind::NoValue => 56,
      ErrorKind::InvValue => 57,
      ErrorKind::Str => 58,
    }
  }
}

impl Error {
  pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
    Self {
      kind,
      message: message.into(),
    }
  }

  pub fn kind(&self) -> ErrorKind {
    self.kind
  }

  pub fn code(&self) -> i32 {
    self.kind.code()
  }

  pub fn cli_arg(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::CliArg, message)
  }

  pub fn file(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::File, message)
  }

  /// A stream failure during WRITE/DPRINT/BREAK.
  pub fn io(e: std::io::Error) -> Self {
    Self::new(ErrorKind::File, format!("Cannot access output stream: {e}"))
  }

  pub fn xml_format(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::XmlFormat, message)
  }

  pub fn xml_struct(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::XmlStruct, message)
  }

  pub fn semantic(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::Semantic, message)
  }

  pub fn bad_type(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::Type, message)
  }

  pub fn no_var(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::NoVar, message)
  }

  pub fn no_frame(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::NoFrame, message)
  }

  pub fn no_value(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::NoValue, message)
  }

  pub fn inv_value(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::InvValue, message)
  }

  pub fn string(message: impl Into<Cow<'static, str>>) -> Self {
    Self::new(ErrorKind::Str, message)
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.message)
  }
}

impl StdError for Error {}
