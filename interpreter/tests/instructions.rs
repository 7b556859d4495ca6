pub mod common;

use common::{imm, instr, label, program, reg, run_until_blocked, SMALL};
use mipsvm_interpreter::{
    ExecutionStatus, Interpreter, InterpreterError, MemoryError, Register, Statement, Variable,
    VmConfig,
};

fn load(statements: Vec<Statement>) -> Interpreter {
    Interpreter::new(program(statements), VmConfig::default()).unwrap()
}

#[test]
fn test_print_int_then_halt() {
    let mut interpreter = load(vec![
        instr("li", [reg("$v0"), imm(1)]),
        instr("li", [reg("$a0"), imm(4)]),
        instr("syscall", []),
        instr("halt", []),
    ]);
    assert_eq!(interpreter.status(), ExecutionStatus::Loaded);
    assert_eq!(interpreter.pc(), 0);

    // The label marker is a step of its own.
    let patch = interpreter.step().unwrap();
    assert!(patch.is_empty());
    assert_eq!(patch.pc, 1);
    assert_eq!(interpreter.status(), ExecutionStatus::Running);

    interpreter.step().unwrap();
    interpreter.step().unwrap();
    let patch = interpreter.step().unwrap();
    assert_eq!(patch.output.as_deref(), Some("4"));
    assert!(patch.register_patch.is_empty());

    let patch = interpreter.step().unwrap();
    assert!(patch.halted);
    assert!(interpreter.is_halted());
    assert_eq!(interpreter.step(), Err(InterpreterError::Halted));
}

#[test]
fn test_forward_jump_skips_statements() {
    let mut interpreter = load(vec![
        instr("j", [label("skip")]),
        instr("li", [reg("$t0"), imm(1)]),
        Statement::label("skip"),
        instr("li", [reg("$t1"), imm(9)]),
        instr("halt", []),
    ]);

    interpreter.step().unwrap();
    let patch = interpreter.step().unwrap();
    // Resumes after the label marker.
    assert_eq!(patch.pc, 4);

    run_until_blocked(&mut interpreter);
    assert_eq!(interpreter.register(Register::T0), 0);
    assert_eq!(interpreter.register(Register::T1), 9);
}

#[test]
fn test_jump_to_absolute_index() {
    let mut interpreter = load(vec![
        instr("j", [imm(3)]),
        instr("li", [reg("$t0"), imm(1)]),
        instr("li", [reg("$t1"), imm(2)]),
        instr("halt", []),
    ]);
    interpreter.step().unwrap();
    assert_eq!(interpreter.step().unwrap().pc, 3);

    let mut interpreter = load(vec![instr("j", [imm(99)])]);
    interpreter.step().unwrap();
    assert_eq!(
        interpreter.step(),
        Err(InterpreterError::ProgramCounterOutOfRange { pc: 99, len: 2 })
    );
}

#[test]
fn test_store_and_load_word() {
    let program = program(vec![
        instr("la", [reg("$t0"), label("buf")]),
        instr("li", [reg("$t1"), imm(-123_456)]),
        instr("sw", [reg("$t1"), reg("$t0")]),
        instr("lw", [reg("$t2"), imm(0), reg("$t0")]),
        instr("addi", [reg("$t3"), reg("$t0"), imm(4)]),
        instr("sw", [imm(77), reg("$t3")]),
        instr("lw", [reg("$t4"), imm(4), reg("$t0")]),
        instr("halt", []),
    ])
    .with_variable(Variable::asciiz("msg", "ab"))
    .with_variable(Variable::space("buf", 8));
    let mut interpreter = Interpreter::new(program, VmConfig::default()).unwrap();

    for _ in 0..3 {
        interpreter.step().unwrap();
    }
    let patch = interpreter.step().unwrap();
    let bytes = (-123_456i32).to_le_bytes();
    assert_eq!(
        patch.memory_patch,
        vec![(3, bytes[0]), (4, bytes[1]), (5, bytes[2]), (6, bytes[3])]
    );

    run_until_blocked(&mut interpreter);
    assert_eq!(interpreter.register(Register::T0), 3);
    assert_eq!(interpreter.register(Register::T2), -123_456);
    assert_eq!(interpreter.register(Register::T4), 77);
    assert_eq!(interpreter.memory().read_word(7).unwrap(), 77);
}

#[test]
fn test_store_ignores_offset() {
    let mut interpreter = load(vec![
        instr("li", [reg("$t0"), imm(16)]),
        instr("li", [reg("$t1"), imm(5)]),
        instr("sw", [reg("$t1"), imm(8), reg("$t0")]),
        instr("halt", []),
    ]);
    run_until_blocked(&mut interpreter);
    assert_eq!(interpreter.memory().read_word(16).unwrap(), 5);
    assert_eq!(interpreter.memory().read_word(24).unwrap(), 0);
}

#[test]
fn test_out_of_bounds_store_changes_nothing() {
    let program = program(vec![
        instr("li", [reg("$t0"), imm(62)]),
        instr("li", [reg("$t1"), imm(7)]),
        instr("sw", [reg("$t1"), reg("$t0")]),
    ]);
    let mut interpreter = Interpreter::new(program, SMALL).unwrap();
    for _ in 0..3 {
        interpreter.step().unwrap();
    }

    let before = interpreter.clone();
    let err = interpreter.step().unwrap_err();
    assert_eq!(
        err,
        InterpreterError::Memory(MemoryError::OutOfBounds {
            address: 62,
            len: 4,
            size: 64
        })
    );
    assert!(interpreter.memory().as_bytes().iter().all(|&byte| byte == 0));
    assert_eq!(interpreter.registers(), before.registers());
    assert_eq!(interpreter.pc(), before.pc());
    assert_eq!(interpreter.updates(), before.updates());
    assert_eq!(interpreter.status(), ExecutionStatus::Running);
}

#[test]
fn test_negative_load_address() {
    let mut interpreter = load(vec![instr("lw", [reg("$t0"), imm(-4), reg("$zero")])]);
    interpreter.step().unwrap();
    assert!(matches!(
        interpreter.step(),
        Err(InterpreterError::Memory(MemoryError::OutOfBounds { address: -4, .. }))
    ));
}

#[test]
fn test_arithmetic() {
    let mut interpreter = load(vec![
        instr("li", [reg("$t0"), imm(i32::MAX)]),
        instr("add", [reg("$t1"), reg("$t0"), imm(1)]),
        instr("li", [reg("$t2"), imm(-7)]),
        instr("div", [reg("$t3"), reg("$t2"), imm(2)]),
        instr("mul", [reg("$t4"), reg("$t2"), reg("$t2")]),
        instr("sub", [reg("$t5"), imm(3), reg("$t2")]),
        instr("andi", [reg("$t6"), reg("$t2"), imm(0xff)]),
        instr("halt", []),
    ]);
    run_until_blocked(&mut interpreter);
    assert_eq!(interpreter.register(Register::T1), i32::MIN);
    assert_eq!(interpreter.register(Register::T3), -3);
    assert_eq!(interpreter.register(Register::T4), 49);
    assert_eq!(interpreter.register(Register::T5), 10);
    assert_eq!(interpreter.register(Register::T6), 0xf9);
}

#[test]
fn test_division_by_zero() {
    let mut interpreter = load(vec![
        instr("li", [reg("$t0"), imm(1)]),
        instr("div", [reg("$t1"), reg("$t0"), reg("$zero")]),
    ]);
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert_eq!(interpreter.step(), Err(InterpreterError::DivisionByZero));
    assert_eq!(interpreter.pc(), 2);
}

#[test]
fn test_set_comparisons() {
    let mut interpreter = load(vec![
        instr("li", [reg("$t0"), imm(3)]),
        instr("slt", [reg("$s0"), reg("$t0"), imm(4)]),
        instr("sgt", [reg("$s1"), reg("$t0"), imm(4)]),
        instr("sle", [reg("$s2"), reg("$t0"), imm(3)]),
        instr("sge", [reg("$s3"), imm(2), reg("$t0")]),
        instr("sne", [reg("$s4"), reg("$t0"), imm(3)]),
        instr("halt", []),
    ]);
    run_until_blocked(&mut interpreter);
    let results = [Register::S0, Register::S1, Register::S2, Register::S3, Register::S4]
        .map(|register| interpreter.register(register));
    assert_eq!(results, [1, 0, 1, 0, 0]);
}

#[test]
fn test_branch_resolves_label_only_when_taken() {
    let mut interpreter = load(vec![
        instr("li", [reg("$t0"), imm(1)]),
        instr("beqz", [reg("$t0"), label("nowhere")]),
        instr("bnez", [reg("$t0"), label("nowhere")]),
    ]);
    for _ in 0..3 {
        interpreter.step().unwrap();
    }
    assert_eq!(
        interpreter.step(),
        Err(InterpreterError::UnknownLabel("nowhere".to_string()))
    );
}

#[test]
fn test_two_register_branch() {
    let mut interpreter = load(vec![
        instr("li", [reg("$t0"), imm(2)]),
        instr("blt", [reg("$t0"), imm(5), label("less")]),
        instr("li", [reg("$v1"), imm(1)]),
        Statement::label("less"),
        instr("halt", []),
    ]);
    run_until_blocked(&mut interpreter);
    assert_eq!(interpreter.register(Register::V1), 0);
}

#[test]
fn test_jump_register_rejects_negative_target() {
    let mut interpreter = load(vec![
        instr("li", [reg("$t0"), imm(-1)]),
        instr("jr", [reg("$t0")]),
    ]);
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert!(matches!(
        interpreter.step(),
        Err(InterpreterError::ProgramCounterOutOfRange { pc: -1, .. })
    ));
}

#[test]
fn test_falling_off_the_end() {
    let mut interpreter = load(vec![instr("li", [reg("$t0"), imm(1)])]);
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert_eq!(
        interpreter.step(),
        Err(InterpreterError::ProgramCounterOutOfRange { pc: 2, len: 2 })
    );
}

#[test]
fn test_zero_register_is_writable() {
    let mut interpreter = load(vec![instr("li", [reg("$zero"), imm(5)])]);
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert_eq!(interpreter.register(Register::Zero), 5);
}

#[test]
fn test_unsupported_instruction_and_operands() {
    let mut interpreter = load(vec![instr("nop", []), instr("li", [imm(1), imm(2)])]);
    interpreter.step().unwrap();
    assert_eq!(
        interpreter.step(),
        Err(InterpreterError::UnsupportedInstruction("nop".to_string()))
    );

    let mut interpreter = load(vec![instr("li", [imm(1), imm(2)])]);
    interpreter.step().unwrap();
    assert!(matches!(
        interpreter.step(),
        Err(InterpreterError::InvalidOperands { opcode: "li", .. })
    ));
}

#[test]
fn test_unsupported_syscall() {
    let mut interpreter = load(vec![instr("li", [reg("$v0"), imm(10)]), instr("syscall", [])]);
    interpreter.step().unwrap();
    interpreter.step().unwrap();
    assert_eq!(interpreter.step(), Err(InterpreterError::UnsupportedSyscall(10)));
}

#[test]
fn test_load_errors() {
    let missing_entry = mipsvm_interpreter::Program::new("start", vec![instr("halt", [])]);
    assert_eq!(
        Interpreter::new(missing_entry, VmConfig::default()).unwrap_err(),
        InterpreterError::EntrypointNotFound("start".to_string())
    );

    let bad_register = program(vec![instr("li", [reg("$t10"), imm(1)])]);
    assert_eq!(
        Interpreter::new(bad_register, VmConfig::default()).unwrap_err(),
        InterpreterError::UnknownRegister("$t10".to_string())
    );

    let too_big = program(vec![]).with_variable(Variable::space("buf", 65));
    assert!(matches!(
        Interpreter::new(too_big, SMALL).unwrap_err(),
        InterpreterError::Memory(MemoryError::OutOfBounds { .. })
    ));
}

#[test]
fn test_entrypoint_need_not_be_first() {
    let program = mipsvm_interpreter::Program::new(
        "main",
        vec![
            Statement::label("helper"),
            instr("li", [reg("$t0"), imm(1)]),
            Statement::label("main"),
            instr("halt", []),
        ],
    );
    let mut interpreter = Interpreter::new(program, VmConfig::default()).unwrap();
    assert_eq!(interpreter.pc(), 2);
    run_until_blocked(&mut interpreter);
    assert_eq!(interpreter.register(Register::T0), 0);
}
