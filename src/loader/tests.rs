use indoc::indoc;

use super::*;
use crate::ErrorKind;

fn load_str(source: &str) -> Result<Program> {
  load(source.as_bytes())
}

fn load_err(source: &str) -> ErrorKind {
  load_str(source).expect_err("document unexpectedly loaded").kind()
}

#[test]
fn minimal_program() {
  let program = load_str(indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <program language="IPPcode22">
      <instruction order="1" opcode="DEFVAR">
        <arg1 type="var">GF@x</arg1>
      </instruction>
      <instruction order="2" opcode="MOVE">
        <arg1 type="var">GF@x</arg1>
        <arg2 type="int">-42</arg2>
      </instruction>
    </program>
  "#})
  .unwrap();

  assert_eq!(
    program.instructions(),
    &[
      Instruction {
        order: 1,
        op: Op::DefVar {
          var: VarRef {
            frame: FrameKind::Global,
            name: "x".into()
          }
        }
      },
      Instruction {
        order: 2,
        op: Op::Move {
          dst: VarRef {
            frame: FrameKind::Global,
            name: "x".into()
          },
          src: Symbol::Const(Value::Int(-42)),
        }
      },
    ]
  );
}

#[test]
fn empty_program_is_valid() {
  let program = load_str(r#"<program language="IPPcode22"></program>"#).unwrap();
  assert!(program.is_empty());
  // self-closing root as well
  let program = load_str(r#"<program language="IPPcode22"/>"#).unwrap();
  assert!(program.is_empty());
}

#[test]
fn opcode_is_case_insensitive() {
  let program = load_str(indoc! {r#"
    <program language="IPPcode22">
      <instruction order="1" opcode="createFrame"/>
      <instruction order="2" opcode="pushs">
        <arg1 type="nil">nil</arg1>
      </instruction>
    </program>
  "#})
  .unwrap();
  assert_eq!(program.get(0).unwrap().op, Op::CreateFrame);
  assert_eq!(
    program.get(1).unwrap().op,
    Op::Pushs {
      src: Symbol::Const(Value::Nil)
    }
  );
}

#[test]
fn instructions_are_sorted_by_order() {
  let program = load_str(indoc! {r#"
    <program language="IPPcode22">
      <instruction order="20" opcode="BREAK"/>
      <instruction order="5" opcode="CREATEFRAME"/>
    </program>
  "#})
  .unwrap();
  assert_eq!(program.get(0).unwrap().op, Op::CreateFrame);
  assert_eq!(program.get(1).unwrap().order, 20);
}

#[test]
fn string_escape_triples() {
  let program = load_str(indoc! {r#"
    <program language="IPPcode22">
      <instruction order="1" opcode="WRITE">
        <arg1 type="string">a\032b\092c\035</arg1>
      </instruction>
    </program>
  "#})
  .unwrap();
  assert_eq!(
    program.get(0).unwrap().op,
    Op::Write {
      src: Symbol::Const(Value::Str("a b\\c#".into()))
    }
  );
}

#[test]
fn stray_backslash_passes_through() {
  let program = load_str(indoc! {r#"
    <program language="IPPcode22">
      <instruction order="1" opcode="WRITE">
        <arg1 type="string">a\9b\</arg1>
      </instruction>
    </program>
  "#})
  .unwrap();
  assert_eq!(
    program.get(0).unwrap().op,
    Op::Write {
      src: Symbol::Const(Value::Str("a\\9b\\".into()))
    }
  );
}

#[test]
fn empty_string_body() {
  let program = load_str(indoc! {r#"
    <program language="IPPcode22">
      <instruction order="1" opcode="WRITE">
        <arg1 type="string"></arg1>
      </instruction>
      <instruction order="2" opcode="WRITE">
        <arg1 type="string"/>
      </instruction>
    </program>
  "#})
  .unwrap();
  for index in 0..2 {
    assert_eq!(
      program.get(index).unwrap().op,
      Op::Write {
        src: Symbol::Const(Value::Str(String::new()))
      }
    );
  }
}

#[test]
fn xml_entities_in_strings() {
  let program = load_str(indoc! {r#"
    <program language="IPPcode22">
      <instruction order="1" opcode="WRITE">
        <arg1 type="string">a&lt;b&amp;c</arg1>
      </instruction>
    </program>
  "#})
  .unwrap();
  assert_eq!(
    program.get(0).unwrap().op,
    Op::Write {
      src: Symbol::Const(Value::Str("a<b&c".into()))
    }
  );
}

#[test]
fn bool_and_type_operands() {
  let program = load_str(indoc! {r#"
    <program language="IPPcode22">
      <instruction order="1" opcode="PUSHS">
        <arg1 type="bool">TRUE</arg1>
      </instruction>
      <instruction order="2" opcode="PUSHS">
        <arg1 type="bool">yes</arg1>
      </instruction>
      <instruction order="3" opcode="READ">
        <arg1 type="var">GF@x</arg1>
        <arg2 type="type">string</arg2>
      </instruction>
    </program>
  "#})
  .unwrap();
  assert_eq!(
    program.get(0).unwrap().op,
    Op::Pushs {
      src: Symbol::Const(Value::Bool(true))
    }
  );
  assert_eq!(
    program.get(1).unwrap().op,
    Op::Pushs {
      src: Symbol::Const(Value::Bool(false))
    }
  );
  assert_eq!(
    program.get(2).unwrap().op,
    Op::Read {
      dst: VarRef {
        frame: FrameKind::Global,
        name: "x".into()
      },
      ty: ReadType::Str,
    }
  );
}

#[test]
fn var_names_keep_their_case_and_symbols() {
  let program = load_str(indoc! {r#"
    <program language="IPPcode22">
      <instruction order="1" opcode="DEFVAR">
        <arg1 type="var">TF@_ruda-Vec$42</arg1>
      </instruction>
    </program>
  "#})
  .unwrap();
  assert_eq!(
    program.get(0).unwrap().op,
    Op::DefVar {
      var: VarRef {
        frame: FrameKind::Temporary,
        name: "_ruda-Vec$42".into()
      }
    }
  );
}

#[test]
fn malformed_xml() {
  assert_eq!(load_err("<program language=\"IPPcode22\">"), ErrorKind::XmlFormat);
  assert_eq!(load_err(""), ErrorKind::XmlFormat);
  assert_eq!(
    load_err("<program language=\"IPPcode22\"></oops>"),
    ErrorKind::XmlFormat
  );
  assert_eq!(
    load_err("<program language=\"IPPcode22\"></program> junk"),
    ErrorKind::XmlFormat
  );
}

#[test]
fn bad_root_or_language() {
  assert_eq!(load_err(r#"<prog language="IPPcode22"/>"#), ErrorKind::XmlStruct);
  assert_eq!(load_err(r#"<program/>"#), ErrorKind::XmlStruct);
  assert_eq!(
    load_err(r#"<program language="IPPcode21"/>"#),
    ErrorKind::XmlStruct
  );
}

#[test]
fn bad_instruction_shape() {
  // unknown opcode
  assert_eq!(
    load_err(r#"<program language="IPPcode22"><instruction order="1" opcode="NOP"/></program>"#),
    ErrorKind::XmlStruct
  );
  // missing attributes
  assert_eq!(
    load_err(r#"<program language="IPPcode22"><instruction order="1"/></program>"#),
    ErrorKind::XmlStruct
  );
  assert_eq!(
    load_err(r#"<program language="IPPcode22"><instruction opcode="BREAK"/></program>"#),
    ErrorKind::XmlStruct
  );
  // negative or non-numeric order
  assert_eq!(
    load_err(
      r#"<program language="IPPcode22"><instruction order="-1" opcode="BREAK"/></program>"#
    ),
    ErrorKind::XmlStruct
  );
  assert_eq!(
    load_err(
      r#"<program language="IPPcode22"><instruction order="one" opcode="BREAK"/></program>"#
    ),
    ErrorKind::XmlStruct
  );
  // stray child element
  assert_eq!(
    load_err(r#"<program language="IPPcode22"><foo/></program>"#),
    ErrorKind::XmlStruct
  );
}

#[test]
fn bad_operands() {
  // missing required operand
  assert_eq!(
    load_err(indoc! {r#"
      <program language="IPPcode22">
        <instruction order="1" opcode="MOVE">
          <arg1 type="var">GF@x</arg1>
        </instruction>
      </program>
    "#}),
    ErrorKind::XmlStruct
  );
  // operand the opcode does not take
  assert_eq!(
    load_err(indoc! {r#"
      <program language="IPPcode22">
        <instruction order="1" opcode="BREAK">
          <arg1 type="int">1</arg1>
        </instruction>
      </program>
    "#}),
    ErrorKind::XmlStruct
  );
  // duplicate slot
  assert_eq!(
    load_err(indoc! {r#"
      <program language="IPPcode22">
        <instruction order="1" opcode="WRITE">
          <arg1 type="int">1</arg1>
          <arg1 type="int">2</arg1>
        </instruction>
      </program>
    "#}),
    ErrorKind::XmlStruct
  );
  // label where a variable is required
  assert_eq!(
    load_err(indoc! {r#"
      <program language="IPPcode22">
        <instruction order="1" opcode="DEFVAR">
          <arg1 type="label">x</arg1>
        </instruction>
      </program>
    "#}),
    ErrorKind::XmlStruct
  );
  // bad frame selector, bad int, bad type literal
  assert_eq!(
    load_err(indoc! {r#"
      <program language="IPPcode22">
        <instruction order="1" opcode="DEFVAR">
          <arg1 type="var">XF@x</arg1>
        </instruction>
      </program>
    "#}),
    ErrorKind::XmlStruct
  );
  assert_eq!(
    load_err(indoc! {r#"
      <program language="IPPcode22">
        <instruction order="1" opcode="PUSHS">
          <arg1 type="int">4x</arg1>
        </instruction>
      </program>
    "#}),
    ErrorKind::XmlStruct
  );
  assert_eq!(
    load_err(indoc! {r#"
      <program language="IPPcode22">
        <instruction order="1" opcode="READ">
          <arg1 type="var">GF@x</arg1>
          <arg2 type="type">nil</arg2>
        </instruction>
      </program>
    "#}),
    ErrorKind::XmlStruct
  );
}

#[test]
fn duplicate_label_fails_at_load() {
  assert_eq!(
    load_err(indoc! {r#"
      <program language="IPPcode22">
        <instruction order="1" opcode="LABEL">
          <arg1 type="label">loop</arg1>
        </instruction>
        <instruction order="2" opcode="LABEL">
          <arg1 type="label">loop</arg1>
        </instruction>
      </program>
    "#}),
    ErrorKind::Semantic
  );
}
