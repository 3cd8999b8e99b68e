//! An interpreter for IPPcode22, a three-address instruction language whose
//! programs arrive as XML documents.
//!
//! [`load`] parses a program document into a [`Program`]; an [`Isolate`]
//! executes it against a set of streams and yields the process exit code:
//!
//! ```no_run
//! use std::io;
//!
//! fn main() -> ippcode::Result<()> {
//!   let program = ippcode::load(io::stdin().lock())?;
//!   let mut isolate = ippcode::Isolate::new(program);
//!   let code = isolate.run()?;
//!   std::process::exit(code)
//! }
//! ```

mod error;
mod frame;
mod isolate;
mod loader;
mod op;
mod program;
mod value;

pub use error::{Error, ErrorKind, Result};
pub use frame::{Frame, FrameStore};
pub use isolate::{Input, Isolate, Stdout};
pub use loader::load;
pub use op::{FrameKind, Instruction, Op, ReadType, Symbol, VarRef};
pub use program::Program;
pub use value::{Type, Value};
