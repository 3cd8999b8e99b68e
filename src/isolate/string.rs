use crate::error::{Error, Result};
use crate::value::Value;

pub fn int2char(value: Value) -> Result<Value> {
  let code = value.to_int().ok_or_else(|| Error::bad_type("Bad operand type"))?;
  let c = u32::try_from(code)
    .ok()
    .and_then(char::from_u32)
    .ok_or_else(|| Error::string(format!("`{code}` is not a valid code point")))?;
  Ok(Value::Str(c.to_string()))
}

pub fn stri2int(value: Value, index: Value) -> Result<Value> {
  let (s, index) = string_and_index(&value, &index)?;
  Ok(Value::Int(char_at(s, index)? as i64))
}

pub fn concat(lhs: Value, rhs: Value) -> Result<Value> {
  match (lhs, rhs) {
    (Value::Str(mut lhs), Value::Str(rhs)) => {
      lhs.push_str(&rhs);
      Ok(Value::Str(lhs))
    }
    _ => Err(Error::bad_type("Bad operand types")),
  }
}

pub fn strlen(value: Value) -> Result<Value> {
  match value {
    Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
    _ => Err(Error::bad_type("Bad operand type")),
  }
}

pub fn getchar(value: Value, index: Value) -> Result<Value> {
  let (s, index) = string_and_index(&value, &index)?;
  Ok(Value::Str(char_at(s, index)?.to_string()))
}

/// Replaces the code point of `dst` at `index` with the first code point of
/// `src`.
pub fn setchar(dst: Value, index: Value, src: Value) -> Result<Value> {
  let (src, index) = match (&src, index.to_int()) {
    (Value::Str(src), Some(index)) => (src, index),
    _ => return Err(Error::bad_type("Bad operand types")),
  };
  let replacement = src
    .chars()
    .next()
    .ok_or_else(|| Error::string("Empty replacement string"))?;
  let dst = match dst {
    Value::Str(dst) => dst,
    _ => return Err(Error::bad_type("Bad operand types")),
  };
  let index = usize::try_from(index)
    .ok()
    .filter(|&i| i < dst.chars().count())
    .ok_or_else(|| Error::string("Index out of range"))?;
  Ok(Value::Str(
    dst
      .chars()
      .enumerate()
      .map(|(i, c)| if i == index { replacement } else { c })
      .collect(),
  ))
}

fn string_and_index<'a>(value: &'a Value, index: &Value) -> Result<(&'a str, i64)> {
  match (value, index.to_int()) {
    (Value::Str(s), Some(index)) => Ok((s, index)),
    _ => Err(Error::bad_type("Bad operand types")),
  }
}

// index must fall in [0, len), measured in code points
fn char_at(s: &str, index: i64) -> Result<char> {
  usize::try_from(index)
    .ok()
    .and_then(|i| s.chars().nth(i))
    .ok_or_else(|| Error::string("Index out of range"))
}
