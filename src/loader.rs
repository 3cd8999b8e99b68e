use std::io::BufRead;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::op::{FrameKind, Instruction, Op, ReadType, Symbol, VarRef};
use crate::program::Program;
use crate::value::Value;

/// Parses a program document and delivers the executable [`Program`].
///
/// Malformed XML is an XMLFORMAT error; a well-formed document that is not a
/// valid program (wrong root, bad attributes, unknown opcode, mis-shaped
/// operands) is an XMLSTRUCT error.
pub fn load(source: impl BufRead) -> Result<Program> {
  let mut reader = Reader::from_reader(source);
  reader.config_mut().expand_empty_elements = true;
  Loader {
    reader,
    buf: Vec::new(),
  }
  .load()
}

struct Loader<R> {
  reader: Reader<R>,
  buf: Vec<u8>,
}

impl<R: BufRead> Loader<R> {
  fn load(mut self) -> Result<Program> {
    self.read_root()?;
    let instrs = self.read_instructions()?;
    self.read_epilogue()?;
    Program::new(instrs)
  }

  fn next(&mut self) -> Result<Event<'static>> {
    self.buf.clear();
    let event = self
      .reader
      .read_event_into(&mut self.buf)
      .map_err(|e| Error::xml_format(format!("XML not well-formed: {e}")))?;
    Ok(event.into_owned())
  }

  /// Consumes the prolog and the `<program language="IPPcode22">` opening
  /// tag.
  fn read_root(&mut self) -> Result<()> {
    loop {
      match self.next()? {
        Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
        Event::Text(t) if is_blank(&t) => continue,
        Event::Start(e) => {
          if e.name().as_ref() != b"program" {
            return Err(Error::xml_struct("Root element must be `program`"));
          }
          let language = self
            .attribute(&e, b"language")?
            .ok_or_else(|| Error::xml_struct("Missing `language` attribute"))?;
          if language != "IPPcode22" {
            return Err(Error::xml_struct("`language` attribute must be IPPcode22"));
          }
          return Ok(());
        }
        Event::Eof => return Err(Error::xml_format("XML not well-formed: no root element")),
        _ => return Err(Error::xml_format("XML not well-formed: junk before root element")),
      }
    }
  }

  /// Consumes `<instruction>` elements up to `</program>`.
  fn read_instructions(&mut self) -> Result<Vec<Instruction>> {
    let mut instrs = Vec::new();
    loop {
      match self.next()? {
        // stray text and comments between instructions carry no meaning
        Event::Text(_) | Event::Comment(_) => continue,
        Event::Start(e) => {
          if e.name().as_ref() != b"instruction" {
            return Err(Error::xml_struct(
              "Root element must contain only `instruction` elements",
            ));
          }
          instrs.push(self.read_instruction(&e)?);
        }
        Event::End(_) => return Ok(instrs),
        Event::Eof => return Err(Error::xml_format("XML not well-formed: unexpected end of document")),
        _ => return Err(Error::xml_format("XML not well-formed")),
      }
    }
  }

  /// Consumes one instruction element, `<instruction ...>` through its end
  /// tag, and decodes it.
  fn read_instruction(&mut self, e: &BytesStart) -> Result<Instruction> {
    let opcode = self
      .attribute(e, b"opcode")?
      .ok_or_else(|| Error::xml_struct("Missing `opcode` attribute"))?
      .to_uppercase();
    let order = self
      .attribute(e, b"order")?
      .ok_or_else(|| Error::xml_struct("Missing `order` attribute"))?;
    let order = order
      .trim()
      .parse::<u32>()
      .map_err(|_| Error::xml_struct(format!("Invalid instruction order `{order}`")))?;

    let mut slots: [Option<Arg>; 3] = [None, None, None];
    loop {
      match self.next()? {
        Event::Text(_) | Event::Comment(_) => continue,
        Event::Start(arg) => {
          let index = match arg.name().as_ref() {
            b"arg1" => 0,
            b"arg2" => 1,
            b"arg3" => 2,
            _ => {
              return Err(Error::xml_struct(
                "Instruction element must contain only argument elements",
              ))
            }
          };
          if slots[index].is_some() {
            return Err(Error::xml_struct(format!("Duplicate arg{}", index + 1)));
          }
          let ty = self
            .attribute(&arg, b"type")?
            .ok_or_else(|| Error::xml_struct("Missing `type` attribute"))?;
          let text = self.read_arg_text()?;
          slots[index] = Some(decode_arg(&ty, &text)?);
        }
        Event::End(_) => break,
        Event::Eof => return Err(Error::xml_format("XML not well-formed: unexpected end of document")),
        _ => return Err(Error::xml_format("XML not well-formed")),
      }
    }

    let op = decode_op(&opcode, Args { slots })?;
    Ok(Instruction { order, op })
  }

  /// Collects the text content of an argument element up to its end tag.
  fn read_arg_text(&mut self) -> Result<String> {
    let mut text = String::new();
    loop {
      match self.next()? {
        Event::Text(t) => {
          let chunk = t
            .unescape()
            .map_err(|e| Error::xml_format(format!("XML not well-formed: {e}")))?;
          text.push_str(&chunk);
        }
        Event::CData(t) => {
          let chunk = self
            .reader
            .decoder()
            .decode(&t)
            .map_err(|e| Error::xml_format(format!("XML not well-formed: {e}")))?;
          text.push_str(&chunk);
        }
        Event::Comment(_) => continue,
        Event::Start(_) => {
          return Err(Error::xml_struct(
            "Argument element must not contain child elements",
          ))
        }
        Event::End(_) => return Ok(text),
        Event::Eof => return Err(Error::xml_format("XML not well-formed: unexpected end of document")),
        _ => return Err(Error::xml_format("XML not well-formed")),
      }
    }
  }

  /// Only whitespace and comments may follow the root element.
  fn read_epilogue(&mut self) -> Result<()> {
    loop {
      match self.next()? {
        Event::Text(t) if is_blank(&t) => continue,
        Event::Comment(_) | Event::PI(_) => continue,
        Event::Eof => return Ok(()),
        _ => return Err(Error::xml_format("XML not well-formed: junk after root element")),
      }
    }
  }

  fn attribute(&self, e: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
      let attr: Attribute =
        attr.map_err(|e| Error::xml_format(format!("XML not well-formed: {e}")))?;
      if attr.key.as_ref() == name {
        let value = attr
          .unescape_value()
          .map_err(|e| Error::xml_format(format!("XML not well-formed: {e}")))?;
        return Ok(Some(value.into_owned()));
      }
    }
    Ok(None)
  }
}

fn is_blank(text: &[u8]) -> bool {
  text.iter().all(|b| b.is_ascii_whitespace())
}

/// A decoded operand, before the opcode assigns it a role.
enum Arg {
  Var(VarRef),
  Const(Value),
  Label(String),
  Type(ReadType),
}

fn decode_arg(ty: &str, text: &str) -> Result<Arg> {
  match ty {
    "var" => {
      let text = text.trim();
      let (frame, name) = text
        .split_once('@')
        .ok_or_else(|| Error::xml_struct(format!("Invalid variable `{text}`")))?;
      let frame = FrameKind::parse(frame)
        .ok_or_else(|| Error::xml_struct(format!("Invalid frame selector `{frame}`")))?;
      Ok(Arg::Var(VarRef {
        frame,
        name: name.to_string(),
      }))
    }
    "int" => {
      let value = text
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::xml_struct(format!("Invalid int literal `{text}`")))?;
      Ok(Arg::Const(Value::Int(value)))
    }
    "bool" => Ok(Arg::Const(Value::Bool(text.trim().eq_ignore_ascii_case("true")))),
    "string" => Ok(Arg::Const(Value::Str(decode_string(text)?))),
    "nil" => Ok(Arg::Const(Value::Nil)),
    "label" => {
      let name = text.trim();
      if name.is_empty() {
        return Err(Error::xml_struct("Empty label name"));
      }
      Ok(Arg::Label(name.to_string()))
    }
    "type" => match text.trim() {
      "int" => Ok(Arg::Type(ReadType::Int)),
      "string" => Ok(Arg::Type(ReadType::Str)),
      "bool" => Ok(Arg::Type(ReadType::Bool)),
      other => Err(Error::xml_struct(format!("Invalid type literal `{other}`"))),
    },
    _ => Err(Error::xml_struct(format!("Invalid `type` attribute value `{ty}`"))),
  }
}

/// Replaces `\ddd` escape triples with the code point numbered `ddd`.
/// A backslash not followed by exactly three digits passes through verbatim.
fn decode_string(text: &str) -> Result<String> {
  let chars: Vec<char> = text.chars().collect();
  let mut out = String::with_capacity(text.len());
  let mut i = 0;
  while i < chars.len() {
    let c = chars[i];
    let escape = c == '\\'
      && i + 3 < chars.len()
      && chars[i + 1..i + 4].iter().all(|c| c.is_ascii_digit());
    if !escape {
      out.push(c);
      i += 1;
      continue;
    }
    let code = chars[i + 1..i + 4].iter().collect::<String>();
    match code.parse::<u32>().ok().and_then(char::from_u32) {
      Some(c) => out.push(c),
      None => return Err(Error::xml_struct(format!("Invalid escape `\\{code}`"))),
    }
    i += 4;
  }
  Ok(out)
}

/// Operand slots of one instruction, consumed by role as the opcode demands.
struct Args {
  slots: [Option<Arg>; 3],
}

impl Args {
  fn take(&mut self, n: usize) -> Result<Arg> {
    self.slots[n - 1]
      .take()
      .ok_or_else(|| Error::xml_struct(format!("Missing arg{n}")))
  }

  fn var(&mut self, n: usize) -> Result<VarRef> {
    match self.take(n)? {
      Arg::Var(var) => Ok(var),
      _ => Err(Error::xml_struct(format!("arg{n} must be a variable"))),
    }
  }

  fn symbol(&mut self, n: usize) -> Result<Symbol> {
    match self.take(n)? {
      Arg::Var(var) => Ok(Symbol::Var(var)),
      Arg::Const(value) => Ok(Symbol::Const(value)),
      _ => Err(Error::xml_struct(format!("arg{n} must be a symbol"))),
    }
  }

  fn label(&mut self, n: usize) -> Result<String> {
    match self.take(n)? {
      Arg::Label(name) => Ok(name),
      _ => Err(Error::xml_struct(format!("arg{n} must be a label"))),
    }
  }

  fn read_type(&mut self, n: usize) -> Result<ReadType> {
    match self.take(n)? {
      Arg::Type(ty) => Ok(ty),
      _ => Err(Error::xml_struct(format!("arg{n} must be a type"))),
    }
  }

  fn finish(self) -> Result<()> {
    for (i, slot) in self.slots.iter().enumerate() {
      if slot.is_some() {
        return Err(Error::xml_struct(format!("Unexpected arg{}", i + 1)));
      }
    }
    Ok(())
  }
}

fn decode_op(opcode: &str, mut args: Args) -> Result<Op> {
  let op = match opcode {
    "MOVE" => Op::Move {
      dst: args.var(1)?,
      src: args.symbol(2)?,
    },
    "CREATEFRAME" => Op::CreateFrame,
    "PUSHFRAME" => Op::PushFrame,
    "POPFRAME" => Op::PopFrame,
    "DEFVAR" => Op::DefVar { var: args.var(1)? },
    "CALL" => Op::Call {
      label: args.label(1)?,
    },
    "RETURN" => Op::Return,

    "PUSHS" => Op::Pushs {
      src: args.symbol(1)?,
    },
    "POPS" => Op::Pops { dst: args.var(1)? },

    "ADD" => Op::Add {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "SUB" => Op::Sub {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "MUL" => Op::Mul {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "IDIV" => Op::Idiv {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "LT" => Op::Lt {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "GT" => Op::Gt {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "EQ" => Op::Eq {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "AND" => Op::And {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "OR" => Op::Or {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "NOT" => Op::Not {
      dst: args.var(1)?,
      src: args.symbol(2)?,
    },

    "INT2CHAR" => Op::Int2Char {
      dst: args.var(1)?,
      src: args.symbol(2)?,
    },
    "STRI2INT" => Op::Stri2Int {
      dst: args.var(1)?,
      src: args.symbol(2)?,
      index: args.symbol(3)?,
    },
    "CONCAT" => Op::Concat {
      dst: args.var(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "STRLEN" => Op::Strlen {
      dst: args.var(1)?,
      src: args.symbol(2)?,
    },
    "GETCHAR" => Op::Getchar {
      dst: args.var(1)?,
      src: args.symbol(2)?,
      index: args.symbol(3)?,
    },
    "SETCHAR" => Op::Setchar {
      dst: args.var(1)?,
      index: args.symbol(2)?,
      src: args.symbol(3)?,
    },
    "TYPE" => Op::Type {
      dst: args.var(1)?,
      src: args.symbol(2)?,
    },

    "READ" => Op::Read {
      dst: args.var(1)?,
      ty: args.read_type(2)?,
    },
    "WRITE" => Op::Write {
      src: args.symbol(1)?,
    },
    "DPRINT" => Op::Dprint {
      src: args.symbol(1)?,
    },
    "BREAK" => Op::Break,

    "LABEL" => Op::Label {
      name: args.label(1)?,
    },
    "JUMP" => Op::Jump {
      label: args.label(1)?,
    },
    "JUMPIFEQ" => Op::JumpIfEq {
      label: args.label(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "JUMPIFNEQ" => Op::JumpIfNeq {
      label: args.label(1)?,
      lhs: args.symbol(2)?,
      rhs: args.symbol(3)?,
    },
    "EXIT" => Op::Exit {
      code: args.symbol(1)?,
    },

    "CLEARS" => Op::Clears,
    "ADDS" => Op::Adds,
    "SUBS" => Op::Subs,
    "MULS" => Op::Muls,
    "IDIVS" => Op::Idivs,
    "LTS" => Op::Lts,
    "GTS" => Op::Gts,
    "EQS" => Op::Eqs,
    "ANDS" => Op::Ands,
    "ORS" => Op::Ors,
    "NOTS" => Op::Nots,
    "INT2CHARS" => Op::Int2Chars,
    "STRI2INTS" => Op::Stri2Ints,
    "JUMPIFEQS" => Op::JumpIfEqs {
      label: args.label(1)?,
    },
    "JUMPIFNEQS" => Op::JumpIfNeqs {
      label: args.label(1)?,
    },

    _ => return Err(Error::xml_struct(format!("Unknown opcode `{opcode}`"))),
  };
  args.finish()?;
  Ok(op)
}

#[cfg(test)]
mod tests;
