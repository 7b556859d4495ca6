//! The structured program consumed by the interpreter.
//!
//! These types mirror the output of the external MIPS parser: a data section
//! of named variables and a text section of labels and instructions. Nothing
//! here is validated; names and mnemonics are resolved lazily by the loader
//! and the dispatcher.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A complete program: data segment plus text segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(default)]
    pub data_section: DataSection,
    pub text_section: TextSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSection {
    #[serde(default)]
    pub variables: Vec<Variable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSection {
    /// Name of the label where execution starts.
    pub entrypoint: String,
    pub statements: Vec<Statement>,
}

/// A data-segment declaration such as `msg: .asciiz "hello"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    /// Variable kind as written by the parser (`asciiz`, `space`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub value: VariableValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum VariableValue {
    String(String),
    Integer(i64),
}

/// One line of the text segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Statement {
    /// A position marker. It occupies a slot so that pc values stay
    /// consistent indices into the statement list.
    Label(String),
    Instruction(Instruction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// The mnemonic, e.g. `li` or `beqz`.
    #[serde(rename = "kind")]
    pub opcode: String,
    #[serde(rename = "args", default)]
    pub operands: SmallVec<[Operand; 3]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Operand {
    Register(String),
    Immediate(i32),
    /// A symbolic reference, resolved by name when the instruction executes.
    Label(String),
}

impl Program {
    pub fn new(entrypoint: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            data_section: DataSection::default(),
            text_section: TextSection {
                entrypoint: entrypoint.into(),
                statements,
            },
        }
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.data_section.variables.push(variable);
        self
    }
}

impl Variable {
    pub fn asciiz(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "asciiz".to_string(),
            value: VariableValue::String(value.into()),
        }
    }

    pub fn space(name: impl Into<String>, len: i64) -> Self {
        Self {
            name: name.into(),
            kind: "space".to_string(),
            value: VariableValue::Integer(len),
        }
    }
}

impl Statement {
    pub fn label(name: impl Into<String>) -> Self {
        Self::Label(name.into())
    }

    pub fn instruction(opcode: &str, operands: impl IntoIterator<Item = Operand>) -> Self {
        Self::Instruction(Instruction {
            opcode: opcode.to_string(),
            operands: operands.into_iter().collect(),
        })
    }

    pub fn is_label_named(&self, name: &str) -> bool {
        matches!(self, Self::Label(label) if label == name)
    }
}

impl Operand {
    pub fn reg(name: &str) -> Self {
        Self::Register(name.to_string())
    }

    pub const fn imm(value: i32) -> Self {
        Self::Immediate(value)
    }

    pub fn label(name: &str) -> Self {
        Self::Label(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_match_deserialized_shape() {
        let program = Program::new(
            "main",
            vec![
                Statement::label("main"),
                Statement::instruction("li", [Operand::reg("$v0"), Operand::imm(1)]),
            ],
        )
        .with_variable(Variable::asciiz("msg", "hi"));

        assert_eq!(program.text_section.statements.len(), 2);
        assert!(program.text_section.statements[0].is_label_named("main"));
        assert!(!program.text_section.statements[1].is_label_named("main"));
        assert_eq!(program.data_section.variables[0].kind, "asciiz");
    }

    #[test]
    fn test_json_contract() {
        let json = r#"{
            "dataSection": { "variables": [
                { "name": "msg", "type": "asciiz", "value": { "kind": "string", "value": "hi\\n" } }
            ] },
            "textSection": { "entrypoint": "main", "statements": [
                { "kind": "label", "value": "main" },
                { "kind": "instruction", "value": { "kind": "la", "args": [
                    { "kind": "register", "value": "$a0" }, { "kind": "label", "value": "msg" } ] } },
                { "kind": "instruction", "value": { "kind": "syscall" } }
            ] }
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();

        let expected = Program::new(
            "main",
            vec![
                Statement::label("main"),
                Statement::instruction("la", [Operand::reg("$a0"), Operand::label("msg")]),
                Statement::instruction("syscall", []),
            ],
        )
        .with_variable(Variable::asciiz("msg", r"hi\n"));
        assert_eq!(program, expected);

        let without_data: Program =
            serde_json::from_str(r#"{"textSection": {"entrypoint": "main", "statements": []}}"#)
                .unwrap();
        assert!(without_data.data_section.variables.is_empty());
    }
}
