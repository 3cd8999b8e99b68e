use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::op::{Instruction, Op};

/// An executable program: the instruction sequence sorted by order key, plus
/// the label index built in a single pass before execution starts.
#[derive(Debug)]
pub struct Program {
  instrs: Vec<Instruction>,
  labels: IndexMap<String, usize>,
}

impl Program {
  /// Sorts the loaded instructions and indexes the labels.
  ///
  /// The sort is stable, so instructions sharing an order key keep their
  /// document order. A label defined twice is a semantic error.
  pub fn new(mut instrs: Vec<Instruction>) -> Result<Program> {
    instrs.sort_by_key(|instr| instr.order);

    let mut labels = IndexMap::new();
    for (index, instr) in instrs.iter().enumerate() {
      if let Op::Label { name } = &instr.op {
        if labels.insert(name.clone(), index).is_some() {
          return Err(Error::semantic(format!("Label `{name}` already exists")));
        }
      }
    }

    Ok(Program { instrs, labels })
  }

  pub fn len(&self) -> usize {
    self.instrs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instrs.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&Instruction> {
    self.instrs.get(index)
  }

  pub fn instructions(&self) -> &[Instruction] {
    &self.instrs
  }

  /// Index of a label definition. Jump targets resolve through here.
  pub fn label(&self, name: &str) -> Result<usize> {
    self
      .labels
      .get(name)
      .copied()
      .ok_or_else(|| Error::semantic(format!("Label `{name}` does not exist")))
  }
}
