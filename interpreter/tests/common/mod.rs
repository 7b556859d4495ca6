#![allow(dead_code)]

use mipsvm_interpreter::{
    Interpreter, Memory, Operand, Patch, Program, RegisterFile, Statement, VmConfig,
};

/// A small memory so that out-of-bounds cases are cheap to reach.
pub const SMALL: VmConfig = VmConfig::new(64, 0);

pub fn parse_program(json: &str) -> Program {
    serde_json::from_str(json).expect("demo programs are valid JSON")
}

/// A program whose text is `main:` followed by `statements`.
pub fn program(statements: Vec<Statement>) -> Program {
    let mut all = vec![Statement::label("main")];
    all.extend(statements);
    Program::new("main", all)
}

pub fn instr<const N: usize>(opcode: &str, operands: [Operand; N]) -> Statement {
    Statement::instruction(opcode, operands)
}

pub fn reg(name: &str) -> Operand {
    Operand::reg(name)
}

pub fn imm(value: i32) -> Operand {
    Operand::imm(value)
}

pub fn label(name: &str) -> Operand {
    Operand::label(name)
}

/// Steps until halted or interrupted, concatenating all output.
pub fn run_until_blocked(interpreter: &mut Interpreter) -> String {
    let mut output = String::new();
    while !interpreter.is_halted() && !interpreter.is_interrupted() {
        let patch = interpreter.step().expect("step should succeed");
        if let Some(text) = &patch.output {
            output.push_str(text);
        }
    }
    output
}

/// A host-side copy of the interpreter state, maintained only from patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadow {
    pub registers: RegisterFile,
    pub memory: Memory,
    pub pc: usize,
}

impl Shadow {
    pub fn new(config: VmConfig, load: &Patch) -> Self {
        let mut shadow = Self {
            registers: RegisterFile::default(),
            memory: Memory::new(config.total_size()),
            pc: 0,
        };
        shadow.apply(load);
        shadow
    }

    pub fn apply(&mut self, patch: &Patch) {
        patch
            .apply(&mut self.registers, &mut self.memory)
            .expect("patches stay in bounds");
        self.pc = patch.pc;
    }

    pub fn matches(&self, interpreter: &Interpreter) -> bool {
        &self.registers == interpreter.registers()
            && &self.memory == interpreter.memory()
            && self.pc == interpreter.pc()
    }
}
