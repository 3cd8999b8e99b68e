use super::*;

#[test]
fn kinds() {
  assert_eq!(Value::Uninit.ty(), None);
  assert_eq!(Value::Int(1).ty(), Some(Type::Int));
  assert_eq!(Value::Bool(false).ty(), Some(Type::Bool));
  assert_eq!(Value::Str(String::new()).ty(), Some(Type::Str));
  assert_eq!(Value::Nil.ty(), Some(Type::Nil));

  assert_eq!(Type::Str.name(), "string");
  assert_eq!(Type::Nil.name(), "nil");
}

#[test]
fn write_formatting() {
  assert_eq!(Value::Int(-42).to_string(), "-42");
  assert_eq!(Value::Bool(true).to_string(), "true");
  assert_eq!(Value::Bool(false).to_string(), "false");
  assert_eq!(Value::Str("příliš žluťoučký".into()).to_string(), "příliš žluťoučký");
  // nil prints as nothing
  assert_eq!(Value::Nil.to_string(), "");
}

#[test]
fn dump_formatting() {
  assert_eq!(Dump(&Value::Int(7)).to_string(), "7 of int");
  assert_eq!(Dump(&Value::Bool(true)).to_string(), "true of bool");
  assert_eq!(Dump(&Value::Str("a".into())).to_string(), "a of string");
  assert_eq!(Dump(&Value::Nil).to_string(), "nil of nil");
  assert_eq!(Dump(&Value::Uninit).to_string(), "uninitialized");
}

#[test]
fn probes() {
  assert_eq!(Value::Int(3).to_int(), Some(3));
  assert_eq!(Value::Str("3".into()).to_int(), None);
  assert_eq!(Value::Bool(true).to_bool(), Some(true));
  assert_eq!(Value::Str("ahoj".into()).to_str(), Some("ahoj"));
  assert_eq!(Value::Nil.to_str(), None);
}
