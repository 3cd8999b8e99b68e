use crate::error::{Error, Result};
use crate::value::Value;

pub fn add(lhs: Value, rhs: Value) -> Result<Value> {
  let (lhs, rhs) = both_ints(lhs, rhs)?;
  Ok(Value::Int(lhs.wrapping_add(rhs)))
}

pub fn sub(lhs: Value, rhs: Value) -> Result<Value> {
  let (lhs, rhs) = both_ints(lhs, rhs)?;
  Ok(Value::Int(lhs.wrapping_sub(rhs)))
}

pub fn mul(lhs: Value, rhs: Value) -> Result<Value> {
  let (lhs, rhs) = both_ints(lhs, rhs)?;
  Ok(Value::Int(lhs.wrapping_mul(rhs)))
}

pub fn idiv(lhs: Value, rhs: Value) -> Result<Value> {
  let (lhs, rhs) = both_ints(lhs, rhs)?;
  if rhs == 0 {
    return Err(Error::inv_value("Zero division"));
  }
  Ok(Value::Int(floor_div(lhs, rhs)))
}

// quotient rounded toward negative infinity
fn floor_div(lhs: i64, rhs: i64) -> i64 {
  let quot = lhs.wrapping_div(rhs);
  let rem = lhs.wrapping_rem(rhs);
  if rem != 0 && (rem < 0) != (rhs < 0) {
    quot - 1
  } else {
    quot
  }
}

pub fn and(lhs: Value, rhs: Value) -> Result<Value> {
  let (lhs, rhs) = both_bools(lhs, rhs)?;
  Ok(Value::Bool(lhs && rhs))
}

pub fn or(lhs: Value, rhs: Value) -> Result<Value> {
  let (lhs, rhs) = both_bools(lhs, rhs)?;
  Ok(Value::Bool(lhs || rhs))
}

pub fn not(value: Value) -> Result<Value> {
  match value.to_bool() {
    Some(v) => Ok(Value::Bool(!v)),
    None => Err(Error::bad_type("Bad operand type")),
  }
}

fn both_ints(lhs: Value, rhs: Value) -> Result<(i64, i64)> {
  match (lhs.to_int(), rhs.to_int()) {
    (Some(lhs), Some(rhs)) => Ok((lhs, rhs)),
    _ => Err(Error::bad_type("Bad operand types")),
  }
}

fn both_bools(lhs: Value, rhs: Value) -> Result<(bool, bool)> {
  match (lhs.to_bool(), rhs.to_bool()) {
    (Some(lhs), Some(rhs)) => Ok((lhs, rhs)),
    _ => Err(Error::bad_type("Bad operand types")),
  }
}
