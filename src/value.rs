use std::fmt::Display;

/// A runtime value held by a variable slot or a data stack slot.
///
/// `Uninit` is the state of a freshly defined variable and is distinct from
/// `Nil`, which is an ordinary value. Reading an uninitialized slot is a
/// NOVALUE error everywhere except in the TYPE instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
  Uninit,
  Int(i64),
  Bool(bool),
  Str(String),
  Nil,
}

/// The kind of an initialized value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Type {
  Int,
  Bool,
  Str,
  Nil,
}

impl Type {
  /// Canonical name, as stored by the TYPE instruction.
  pub fn name(self) -> &'static str {
    match self {
      Type::Int => "int",
      Type::Bool => "bool",
      Type::Str => "string",
      Type::Nil => "nil",
    }
  }
}

impl Display for Type {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl Value {
  /// Kind of this value, `None` for an uninitialized slot.
  pub fn ty(&self) -> Option<Type> {
    match self {
      Value::Uninit => None,
      Value::Int(_) => Some(Type::Int),
      Value::Bool(_) => Some(Type::Bool),
      Value::Str(_) => Some(Type::Str),
      Value::Nil => Some(Type::Nil),
    }
  }

  pub fn to_int(&self) -> Option<i64> {
    match self {
      Value::Int(v) => Some(*v),
      _ => None,
    }
  }

  pub fn to_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(v) => Some(*v),
      _ => None,
    }
  }

  pub fn to_str(&self) -> Option<&str> {
    match self {
      Value::Str(v) => Some(v),
      _ => None,
    }
  }
}

/// WRITE formatting: decimal ints, `true`/`false`, raw strings, and nothing
/// at all for nil.
impl Display for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Value::Uninit | Value::Nil => Ok(()),
      Value::Int(v) => write!(f, "{v}"),
      Value::Bool(true) => f.write_str("true"),
      Value::Bool(false) => f.write_str("false"),
      Value::Str(v) => f.write_str(v),
    }
  }
}

/// Formats a value as `value of kind` for BREAK dumps.
pub struct Dump<'a>(pub &'a Value);

impl Display for Dump<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self.0 {
      Value::Uninit => f.write_str("uninitialized"),
      Value::Nil => f.write_str("nil of nil"),
      value => match value.ty() {
        Some(ty) => write!(f, "{value} of {ty}"),
        None => Ok(()),
      },
    }
  }
}

#[cfg(test)]
mod tests;
