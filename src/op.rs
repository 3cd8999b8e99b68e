use std::fmt::Display;

use crate::value::Value;

/// Frame selector of a variable reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
  Global,
  Local,
  Temporary,
}

impl FrameKind {
  pub fn parse(s: &str) -> Option<FrameKind> {
    match s {
      "GF" => Some(FrameKind::Global),
      "LF" => Some(FrameKind::Local),
      "TF" => Some(FrameKind::Temporary),
      _ => None,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      FrameKind::Global => "GF",
      FrameKind::Local => "LF",
      FrameKind::Temporary => "TF",
    }
  }
}

impl Display for FrameKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

/// A `FRAME@NAME` variable reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarRef {
  pub frame: FrameKind,
  pub name: String,
}

impl Display for VarRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}@{}", self.frame, self.name)
  }
}

/// An operand that resolves to a value at runtime: either a variable
/// reference or an immediate constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Symbol {
  Var(VarRef),
  Const(Value),
}

/// The requested parse type of a READ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadType {
  Int,
  Str,
  Bool,
}

/// A decoded instruction body: one closed variant per opcode, carrying its
/// typed operands. The loader produces these directly; nothing is looked up
/// by name after loading.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
  Move { dst: VarRef, src: Symbol },
  CreateFrame,
  PushFrame,
  PopFrame,
  DefVar { var: VarRef },
  Call { label: String },
  Return,

  Pushs { src: Symbol },
  Pops { dst: VarRef },

  Add { dst: VarRef, lhs: Symbol, rhs: Symbol },
  Sub { dst: VarRef, lhs: Symbol, rhs: Symbol },
  Mul { dst: VarRef, lhs: Symbol, rhs: Symbol },
  Idiv { dst: VarRef, lhs: Symbol, rhs: Symbol },
  Lt { dst: VarRef, lhs: Symbol, rhs: Symbol },
  Gt { dst: VarRef, lhs: Symbol, rhs: Symbol },
  Eq { dst: VarRef, lhs: Symbol, rhs: Symbol },
  And { dst: VarRef, lhs: Symbol, rhs: Symbol },
  Or { dst: VarRef, lhs: Symbol, rhs: Symbol },
  Not { dst: VarRef, src: Symbol },

  Int2Char { dst: VarRef, src: Symbol },
  Stri2Int { dst: VarRef, src: Symbol, index: Symbol },
  Concat { dst: VarRef, lhs: Symbol, rhs: Symbol },
  Strlen { dst: VarRef, src: Symbol },
  Getchar { dst: VarRef, src: Symbol, index: Symbol },
  Setchar { dst: VarRef, index: Symbol, src: Symbol },
  Type { dst: VarRef, src: Symbol },

  Read { dst: VarRef, ty: ReadType },
  Write { src: Symbol },
  Dprint { src: Symbol },
  Break,

  Label { name: String },
  Jump { label: String },
  JumpIfEq { label: String, lhs: Symbol, rhs: Symbol },
  JumpIfNeq { label: String, lhs: Symbol, rhs: Symbol },
  Exit { code: Symbol },

  // stack forms
  Clears,
  Adds,
  Subs,
  Muls,
  Idivs,
  Lts,
  Gts,
  Eqs,
  Ands,
  Ors,
  Nots,
  Int2Chars,
  Stri2Ints,
  JumpIfEqs { label: String },
  JumpIfNeqs { label: String },
}

/// An instruction together with its source order key. Execution order is the
/// ascending `order` permutation of the loaded sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
  pub order: u32,
  pub op: Op,
}
