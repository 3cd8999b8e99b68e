mod binop;
mod cmp;
mod string;

use std::any::Any;
use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};
use crate::frame::{Frame, FrameStore};
use crate::op::{Op, ReadType, Symbol, VarRef};
use crate::program::Program;
use crate::value::{Dump, Value};

/// Output stream handle. Anything `Write` works; `Any` lets tests downcast
/// a captured buffer back out.
pub trait Stdout: Write + Any {
  fn as_any(&self) -> &dyn Any;
}

impl<T: Write + Any> Stdout for T {
  fn as_any(&self) -> &dyn Any {
    self
  }
}

/// Input stream handle consumed by READ.
pub trait Input: BufRead + Any {
  fn as_any(&self) -> &dyn Any;
}

impl<T: BufRead + Any> Input for T {
  fn as_any(&self) -> &dyn Any {
    self
  }
}

/// The execution engine: a loaded program plus all mutable run state.
///
/// Streams are injected so WRITE/DPRINT/BREAK and READ are capturable; there
/// is no global stream state anywhere in the engine.
pub struct Isolate {
  program: Program,
  pc: usize,
  frames: FrameStore,
  call_stack: Vec<usize>,
  data_stack: Vec<Value>,
  input: Box<dyn Input>,
  stdout: Box<dyn Stdout>,
  stderr: Box<dyn Stdout>,
}

impl Isolate {
  /// An engine over the process standard streams.
  pub fn new(program: Program) -> Isolate {
    Isolate::with_io(
      program,
      io::BufReader::new(io::stdin()),
      io::stdout(),
      io::stderr(),
    )
  }

  pub fn with_io(
    program: Program,
    input: impl Input,
    stdout: impl Stdout,
    stderr: impl Stdout,
  ) -> Isolate {
    Isolate {
      program,
      pc: 0,
      frames: FrameStore::new(),
      call_stack: Vec::new(),
      data_stack: Vec::new(),
      input: Box::new(input),
      stdout: Box::new(stdout),
      stderr: Box::new(stderr),
    }
  }

  pub fn stdout(&self) -> &dyn Stdout {
    &*self.stdout
  }

  pub fn stderr(&self) -> &dyn Stdout {
    &*self.stderr
  }

  /// Runs the program to completion and returns the process exit code.
  ///
  /// The counter increments after every instruction, jumps included: a jump
  /// stores the label's index and the post-increment moves execution to the
  /// instruction right after the LABEL.
  pub fn run(&mut self) -> Result<i32> {
    while self.pc < self.program.len() {
      let Some(instr) = self.program.get(self.pc) else {
        break;
      };
      let op = instr.op.clone();
      if let Some(code) = self.step(op)? {
        return Ok(code);
      }
      self.pc += 1;
    }
    Ok(0)
  }

  /// Restores the engine to its pre-run state. The program and its label
  /// index are kept.
  pub fn reset(&mut self) {
    self.pc = 0;
    self.frames = FrameStore::new();
    self.call_stack.clear();
    self.data_stack.clear();
  }

  fn step(&mut self, op: Op) -> Result<Option<i32>> {
    match op {
      Op::Move { dst, src } => {
        let value = self.resolve(&src)?;
        *self.frames.get(&dst)? = value;
      }
      Op::CreateFrame => self.frames.create_tmp(),
      Op::PushFrame => self.frames.push_local()?,
      Op::PopFrame => self.frames.pop_local()?,
      Op::DefVar { var } => self.frames.define(&var)?,
      Op::Call { label } => {
        let target = self.program.label(&label)?;
        self.call_stack.push(self.pc);
        self.pc = target;
      }
      Op::Return => {
        self.pc = self
          .call_stack
          .pop()
          .ok_or_else(|| Error::no_value("Empty call stack"))?;
      }

      Op::Pushs { src } => {
        let value = self.resolve(&src)?;
        self.data_stack.push(value);
      }
      Op::Pops { dst } => {
        let value = self.pop()?;
        *self.frames.get(&dst)? = value;
      }

      Op::Add { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, binop::add)?,
      Op::Sub { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, binop::sub)?,
      Op::Mul { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, binop::mul)?,
      Op::Idiv { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, binop::idiv)?,
      Op::Lt { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, cmp::lt)?,
      Op::Gt { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, cmp::gt)?,
      Op::Eq { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, cmp::eq)?,
      Op::And { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, binop::and)?,
      Op::Or { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, binop::or)?,
      Op::Not { dst, src } => self.unary(&dst, &src, binop::not)?,

      Op::Int2Char { dst, src } => self.unary(&dst, &src, string::int2char)?,
      Op::Stri2Int { dst, src, index } => self.binary(&dst, &src, &index, string::stri2int)?,
      Op::Concat { dst, lhs, rhs } => self.binary(&dst, &lhs, &rhs, string::concat)?,
      Op::Strlen { dst, src } => self.unary(&dst, &src, string::strlen)?,
      Op::Getchar { dst, src, index } => self.binary(&dst, &src, &index, string::getchar)?,
      Op::Setchar { dst, index, src } => {
        let index = self.resolve(&index)?;
        let src = self.resolve(&src)?;
        let current = self.frames.read(&dst)?.clone();
        let value = string::setchar(current, index, src)?;
        *self.frames.get(&dst)? = value;
      }
      Op::Type { dst, src } => {
        // the one place where an uninitialized variable may be inspected
        let value = self.peek(&src)?;
        let name = match value.ty() {
          Some(ty) => ty.name(),
          None => "",
        };
        *self.frames.get(&dst)? = Value::Str(name.to_string());
      }

      Op::Read { dst, ty } => self.op_read(&dst, ty)?,
      Op::Write { src } => {
        let value = self.resolve(&src)?;
        write!(self.stdout, "{value}").map_err(Error::io)?;
        self.stdout.flush().map_err(Error::io)?;
      }
      Op::Dprint { src } => {
        let value = self.resolve(&src)?;
        write!(self.stderr, "{value}").map_err(Error::io)?;
      }
      Op::Break => self.op_break()?,

      Op::Label { .. } => {}
      Op::Jump { label } => {
        self.pc = self.program.label(&label)?;
      }
      Op::JumpIfEq { label, lhs, rhs } => {
        let target = self.program.label(&label)?;
        let lhs = self.resolve(&lhs)?;
        let rhs = self.resolve(&rhs)?;
        if cmp::eq_values(&lhs, &rhs)? {
          self.pc = target;
        }
      }
      Op::JumpIfNeq { label, lhs, rhs } => {
        let target = self.program.label(&label)?;
        let lhs = self.resolve(&lhs)?;
        let rhs = self.resolve(&rhs)?;
        if !cmp::eq_values(&lhs, &rhs)? {
          self.pc = target;
        }
      }
      Op::Exit { code } => {
        let value = self.resolve(&code)?;
        let code = value
          .to_int()
          .ok_or_else(|| Error::bad_type("Bad operand type"))?;
        if !(0..=49).contains(&code) {
          return Err(Error::inv_value("Exit code out of range 0-49"));
        }
        return Ok(Some(code as i32));
      }

      Op::Clears => self.data_stack.clear(),
      Op::Adds => self.stack_binary(binop::add)?,
      Op::Subs => self.stack_binary(binop::sub)?,
      Op::Muls => self.stack_binary(binop::mul)?,
      Op::Idivs => self.stack_binary(binop::idiv)?,
      Op::Lts => self.stack_binary(cmp::lt)?,
      Op::Gts => self.stack_binary(cmp::gt)?,
      Op::Eqs => self.stack_binary(cmp::eq)?,
      Op::Ands => self.stack_binary(binop::and)?,
      Op::Ors => self.stack_binary(binop::or)?,
      Op::Nots => self.stack_unary(binop::not)?,
      Op::Int2Chars => self.stack_unary(string::int2char)?,
      Op::Stri2Ints => self.stack_binary(string::stri2int)?,
      Op::JumpIfEqs { label } => {
        let target = self.program.label(&label)?;
        let (lhs, rhs) = self.pop_pair()?;
        if cmp::eq_values(&lhs, &rhs)? {
          self.pc = target;
        }
      }
      Op::JumpIfNeqs { label } => {
        let target = self.program.label(&label)?;
        let (lhs, rhs) = self.pop_pair()?;
        if !cmp::eq_values(&lhs, &rhs)? {
          self.pc = target;
        }
      }
    }
    Ok(None)
  }

  /// Resolves a symbol operand: a variable is read from its frame, a
  /// constant is used as-is.
  fn resolve(&self, sym: &Symbol) -> Result<Value> {
    match sym {
      Symbol::Var(var) => Ok(self.frames.read(var)?.clone()),
      Symbol::Const(value) => Ok(value.clone()),
    }
  }

  // TYPE looks at the slot without requiring initialization
  fn peek(&self, sym: &Symbol) -> Result<Value> {
    match sym {
      Symbol::Var(var) => Ok(self.frames.peek(var)?.clone()),
      Symbol::Const(value) => Ok(value.clone()),
    }
  }

  fn binary(
    &mut self,
    dst: &VarRef,
    lhs: &Symbol,
    rhs: &Symbol,
    f: fn(Value, Value) -> Result<Value>,
  ) -> Result<()> {
    let lhs = self.resolve(lhs)?;
    let rhs = self.resolve(rhs)?;
    let value = f(lhs, rhs)?;
    *self.frames.get(dst)? = value;
    Ok(())
  }

  fn unary(&mut self, dst: &VarRef, src: &Symbol, f: fn(Value) -> Result<Value>) -> Result<()> {
    let src = self.resolve(src)?;
    let value = f(src)?;
    *self.frames.get(dst)? = value;
    Ok(())
  }

  fn stack_binary(&mut self, f: fn(Value, Value) -> Result<Value>) -> Result<()> {
    let (lhs, rhs) = self.pop_pair()?;
    let value = f(lhs, rhs)?;
    self.data_stack.push(value);
    Ok(())
  }

  fn stack_unary(&mut self, f: fn(Value) -> Result<Value>) -> Result<()> {
    let value = self.pop()?;
    let value = f(value)?;
    self.data_stack.push(value);
    Ok(())
  }

  fn pop(&mut self) -> Result<Value> {
    self
      .data_stack
      .pop()
      .ok_or_else(|| Error::no_value("Empty data stack"))
  }

  // the right operand sits on top
  fn pop_pair(&mut self) -> Result<(Value, Value)> {
    let rhs = self.pop()?;
    let lhs = self.pop()?;
    Ok((lhs, rhs))
  }

  fn op_read(&mut self, dst: &VarRef, ty: ReadType) -> Result<()> {
    // the destination must exist before any input is consumed
    self.frames.get(dst)?;
    let value = match self.read_line() {
      None => Value::Nil,
      Some(line) => match ty {
        ReadType::Int => match line.trim().parse::<i64>() {
          Ok(v) => Value::Int(v),
          Err(_) => Value::Nil,
        },
        ReadType::Str => Value::Str(line),
        ReadType::Bool => Value::Bool(line.eq_ignore_ascii_case("true")),
      },
    };
    *self.frames.get(dst)? = value;
    Ok(())
  }

  /// One line of input with its trailing newline stripped; `None` at end of
  /// stream.
  fn read_line(&mut self) -> Option<String> {
    let mut line = String::new();
    match self.input.read_line(&mut line) {
      Ok(0) | Err(_) => None,
      Ok(_) => {
        if line.ends_with('\n') {
          line.pop();
        }
        Some(line)
      }
    }
  }

  /// BREAK: dumps the engine state to the error stream.
  fn op_break(&mut self) -> Result<()> {
    writeln!(self.stderr, "Code position: {}", self.pc + 1).map_err(Error::io)?;
    writeln!(self.stderr, "Global frame:").map_err(Error::io)?;
    dump_frame(&mut self.stderr, Some(self.frames.global())).map_err(Error::io)?;
    writeln!(self.stderr, "Temporary frame:").map_err(Error::io)?;
    dump_frame(&mut self.stderr, self.frames.tmp()).map_err(Error::io)?;
    writeln!(self.stderr, "Topmost local frame:").map_err(Error::io)?;
    dump_frame(&mut self.stderr, self.frames.local_top()).map_err(Error::io)?;
    writeln!(self.stderr, "Data stack:").map_err(Error::io)?;
    if self.data_stack.is_empty() {
      writeln!(self.stderr, "  empty").map_err(Error::io)?;
    } else {
      for value in &self.data_stack {
        writeln!(self.stderr, "  {}", Dump(value)).map_err(Error::io)?;
      }
    }
    Ok(())
  }
}

fn dump_frame(out: &mut impl Write, frame: Option<&Frame>) -> io::Result<()> {
  match frame {
    None => writeln!(out, "  none"),
    Some(frame) if frame.is_empty() => writeln!(out, "  empty"),
    Some(frame) => {
      for (name, value) in frame {
        writeln!(out, "  {name}: {}", Dump(value))?;
      }
      Ok(())
    }
  }
}
