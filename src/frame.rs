use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::op::{FrameKind, VarRef};
use crate::value::Value;

/// A single frame: variable slots in definition order.
pub type Frame = IndexMap<String, Value>;

/// The global frame, the optional temporary frame, and the local frame stack.
///
/// TF moves: PUSHFRAME consumes it onto the local stack, POPFRAME moves the
/// topmost local frame back. Only the topmost local frame is addressable.
pub struct FrameStore {
  global: Frame,
  local: Vec<Frame>,
  tmp: Option<Frame>,
}

impl FrameStore {
  pub fn new() -> FrameStore {
    FrameStore {
      global: Frame::new(),
      local: Vec::new(),
      tmp: None,
    }
  }

  /// CREATEFRAME: sets TF to a fresh empty frame, discarding any previous
  /// contents.
  pub fn create_tmp(&mut self) {
    self.tmp = Some(Frame::new());
  }

  /// PUSHFRAME: moves TF to the top of the local frame stack.
  pub fn push_local(&mut self) -> Result<()> {
    let tmp = self
      .tmp
      .take()
      .ok_or_else(|| Error::no_frame("Temporary frame does not exist"))?;
    self.local.push(tmp);
    Ok(())
  }

  /// POPFRAME: moves the topmost local frame back into TF.
  pub fn pop_local(&mut self) -> Result<()> {
    let top = self
      .local
      .pop()
      .ok_or_else(|| Error::no_frame("Empty local frame stack"))?;
    self.tmp = Some(top);
    Ok(())
  }

  fn resolve(&self, frame: FrameKind) -> Result<&Frame> {
    match frame {
      FrameKind::Global => Ok(&self.global),
      FrameKind::Local => self
        .local
        .last()
        .ok_or_else(|| Error::no_frame("Frame does not exist")),
      FrameKind::Temporary => self
        .tmp
        .as_ref()
        .ok_or_else(|| Error::no_frame("Frame does not exist")),
    }
  }

  fn resolve_mut(&mut self, frame: FrameKind) -> Result<&mut Frame> {
    match frame {
      FrameKind::Global => Ok(&mut self.global),
      FrameKind::Local => self
        .local
        .last_mut()
        .ok_or_else(|| Error::no_frame("Frame does not exist")),
      FrameKind::Temporary => self
        .tmp
        .as_mut()
        .ok_or_else(|| Error::no_frame("Frame does not exist")),
    }
  }

  /// DEFVAR: inserts a fresh uninitialized slot.
  pub fn define(&mut self, var: &VarRef) -> Result<()> {
    let frame = self.resolve_mut(var.frame)?;
    if frame.contains_key(&var.name) {
      return Err(Error::semantic(format!("Variable `{var}` already exists")));
    }
    frame.insert(var.name.clone(), Value::Uninit);
    Ok(())
  }

  /// Mutable handle to a variable slot. The slot may be uninitialized.
  pub fn get(&mut self, var: &VarRef) -> Result<&mut Value> {
    let frame = self.resolve_mut(var.frame)?;
    frame
      .get_mut(&var.name)
      .ok_or_else(|| Error::no_var(format!("Variable `{var}` does not exist")))
  }

  /// Shared handle to a variable slot, without the initialization check.
  /// Only TYPE goes through here.
  pub fn peek(&self, var: &VarRef) -> Result<&Value> {
    let frame = self.resolve(var.frame)?;
    frame
      .get(&var.name)
      .ok_or_else(|| Error::no_var(format!("Variable `{var}` does not exist")))
  }

  /// Reads an initialized variable.
  pub fn read(&self, var: &VarRef) -> Result<&Value> {
    let value = self.peek(var)?;
    if matches!(value, Value::Uninit) {
      return Err(Error::no_value(format!("Variable `{var}` is not initialized")));
    }
    Ok(value)
  }

  pub fn global(&self) -> &Frame {
    &self.global
  }

  pub fn tmp(&self) -> Option<&Frame> {
    self.tmp.as_ref()
  }

  pub fn local_top(&self) -> Option<&Frame> {
    self.local.last()
  }
}

impl Default for FrameStore {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn var(frame: FrameKind, name: &str) -> VarRef {
    VarRef {
      frame,
      name: name.to_string(),
    }
  }

  #[test]
  fn define_and_read() {
    let mut frames = FrameStore::new();
    let x = var(FrameKind::Global, "x");

    frames.define(&x).unwrap();
    assert_eq!(
      frames.read(&x).unwrap_err().kind(),
      crate::ErrorKind::NoValue
    );

    *frames.get(&x).unwrap() = Value::Int(3);
    assert_eq!(frames.read(&x).unwrap(), &Value::Int(3));

    // a second DEFVAR of the same name is a semantic error
    assert_eq!(
      frames.define(&x).unwrap_err().kind(),
      crate::ErrorKind::Semantic
    );
  }

  #[test]
  fn missing_variable_and_frame() {
    let mut frames = FrameStore::new();
    let gf = var(FrameKind::Global, "missing");
    let tf = var(FrameKind::Temporary, "x");
    let lf = var(FrameKind::Local, "x");

    assert_eq!(frames.get(&gf).unwrap_err().kind(), crate::ErrorKind::NoVar);
    assert_eq!(frames.get(&tf).unwrap_err().kind(), crate::ErrorKind::NoFrame);
    assert_eq!(frames.get(&lf).unwrap_err().kind(), crate::ErrorKind::NoFrame);
  }

  #[test]
  fn frame_protocol() {
    let mut frames = FrameStore::new();
    let tf_a = var(FrameKind::Temporary, "a");
    let lf_a = var(FrameKind::Local, "a");

    // PUSHFRAME without TF
    assert_eq!(
      frames.push_local().unwrap_err().kind(),
      crate::ErrorKind::NoFrame
    );
    // POPFRAME with no local frames
    assert_eq!(
      frames.pop_local().unwrap_err().kind(),
      crate::ErrorKind::NoFrame
    );

    frames.create_tmp();
    frames.define(&tf_a).unwrap();
    frames.push_local().unwrap();

    // TF was consumed by the push, the variable is now visible through LF
    assert!(frames.tmp().is_none());
    assert_eq!(frames.get(&tf_a).unwrap_err().kind(), crate::ErrorKind::NoFrame);
    *frames.get(&lf_a).unwrap() = Value::Int(1);

    frames.pop_local().unwrap();
    assert_eq!(frames.read(&tf_a).unwrap(), &Value::Int(1));
  }

  #[test]
  fn createframe_discards_contents() {
    let mut frames = FrameStore::new();
    let a = var(FrameKind::Temporary, "a");

    frames.create_tmp();
    frames.define(&a).unwrap();
    frames.create_tmp();
    assert_eq!(frames.get(&a).unwrap_err().kind(), crate::ErrorKind::NoVar);
  }
}
