use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::value::Value;

pub fn lt(lhs: Value, rhs: Value) -> Result<Value> {
  Ok(Value::Bool(ordering(&lhs, &rhs)? == Ordering::Less))
}

pub fn gt(lhs: Value, rhs: Value) -> Result<Value> {
  Ok(Value::Bool(ordering(&lhs, &rhs)? == Ordering::Greater))
}

pub fn eq(lhs: Value, rhs: Value) -> Result<Value> {
  Ok(Value::Bool(eq_values(&lhs, &rhs)?))
}

/// LT/GT compare within one kind only; nil never orders.
/// Strings order lexicographically per code point, bools as false < true.
fn ordering(lhs: &Value, rhs: &Value) -> Result<Ordering> {
  match (lhs, rhs) {
    (Value::Int(lhs), Value::Int(rhs)) => Ok(lhs.cmp(rhs)),
    (Value::Bool(lhs), Value::Bool(rhs)) => Ok(lhs.cmp(rhs)),
    (Value::Str(lhs), Value::Str(rhs)) => Ok(lhs.cmp(rhs)),
    _ => Err(Error::bad_type("Bad operand types")),
  }
}

/// Equality with the nil sentinel: kinds must match unless one side is nil,
/// and a nil compared against any other kind is simply not equal.
pub fn eq_values(lhs: &Value, rhs: &Value) -> Result<bool> {
  match (lhs, rhs) {
    (Value::Int(lhs), Value::Int(rhs)) => Ok(lhs == rhs),
    (Value::Bool(lhs), Value::Bool(rhs)) => Ok(lhs == rhs),
    (Value::Str(lhs), Value::Str(rhs)) => Ok(lhs == rhs),
    (Value::Nil, Value::Nil) => Ok(true),
    (Value::Nil, _) | (_, Value::Nil) => Ok(false),
    _ => Err(Error::bad_type("Bad operand types")),
  }
}
