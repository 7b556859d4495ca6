use ahash::AHashMap;
use tracing::debug;

use super::{Interpreter, InterpreterError, Patch};
use crate::{
    memory::encode_asciiz,
    program::{Operand, Statement, Variable, VariableValue},
    registers::Register,
};

/// Serializes a data-segment variable into the bytes placed in memory.
pub(crate) fn encode_variable(variable: &Variable) -> Result<Vec<u8>, InterpreterError> {
    let invalid = |reason| InterpreterError::InvalidVariableValue {
        name: variable.name.clone(),
        reason,
    };

    match variable.kind.to_ascii_lowercase().as_str() {
        "asciiz" => match &variable.value {
            VariableValue::String(literal) => Ok(encode_asciiz(literal)),
            VariableValue::Integer(_) => Err(invalid("asciiz expects a string")),
        },
        "space" => match variable.value {
            VariableValue::Integer(len) => usize::try_from(len)
                .map(|len| vec![0; len])
                .map_err(|_| invalid("space expects a non-negative length")),
            VariableValue::String(_) => Err(invalid("space expects a length")),
        },
        _ => Err(InterpreterError::UnsupportedVariableKind(
            variable.kind.clone(),
        )),
    }
}

/// Maps every label to the index of its first definition.
fn label_table(statements: &[Statement]) -> AHashMap<String, usize> {
    let mut labels = AHashMap::new();
    for (index, statement) in statements.iter().enumerate() {
        if let Statement::Label(name) = statement {
            labels.entry(name.clone()).or_insert(index);
        }
    }
    labels
}

/// Resolves every register operand so that an unknown name is reported at
/// load time instead of being executed.
fn check_registers(statements: &[Statement]) -> Result<(), InterpreterError> {
    statements
        .iter()
        .filter_map(|statement| match statement {
            Statement::Instruction(instruction) => Some(instruction),
            Statement::Label(_) => None,
        })
        .flat_map(|instruction| instruction.operands.iter())
        .try_for_each(|operand| match operand {
            Operand::Register(name) => Register::from_name(name).map(|_| ()),
            _ => Ok(()),
        })
}

impl Interpreter {
    /// Loads `self.program` into a cleared interpreter.
    ///
    /// Variables are written back to back from address 0 in declaration
    /// order. The resulting patch holds every data byte and the entrypoint pc.
    pub(crate) fn load(&mut self) -> Result<(), InterpreterError> {
        let text = &self.program.text_section;
        check_registers(&text.statements)?;
        let labels = label_table(&text.statements);
        let entrypoint = *labels
            .get(&text.entrypoint)
            .ok_or_else(|| InterpreterError::EntrypointNotFound(text.entrypoint.clone()))?;

        let mut patch = Patch::new(entrypoint);
        let mut variables = AHashMap::with_capacity(self.program.data_section.variables.len());
        let mut offset = 0usize;
        for variable in &self.program.data_section.variables {
            let bytes = encode_variable(variable)?;
            let address = self.memory.check_range(offset as i64, bytes.len())? as u32;
            patch.memory_patch.extend(
                bytes
                    .iter()
                    .enumerate()
                    .map(|(i, byte)| (address + i as u32, *byte)),
            );
            variables.insert(variable.name.clone(), address);
            offset += bytes.len();
        }

        debug!(
            entrypoint = %text.entrypoint,
            pc = entrypoint,
            data_bytes = offset,
            statements = text.statements.len(),
            "program loaded"
        );

        self.statements = text.statements.clone();
        self.labels = labels;
        self.variables = variables;
        self.commit(patch, None)
    }
}
