//! IR text through the assembler and engine, using only the public API.

use aster::bytecode::{Opcode, Program};
use aster::{RuntimeError, Stop, Value, Vm, VmConfig, assemble};

fn run(source: &str) -> (aster::Execution, String) {
    let assembly = assemble(source);
    let mut vm = Vm::new(assembly.program);
    let mut out = Vec::new();
    let execution = vm.run_with_output(&mut out);
    (execution, String::from_utf8(out).unwrap())
}

#[test]
fn answer_program_assembles_and_reports_42() {
    let source = "define public function @main(none): i32 {\n\tpush const i32: 42\n\tret\n}\n";
    let assembly = assemble(source);
    assert!(assembly.is_clean());

    let program = &assembly.program;
    assert_eq!(program.code, vec![Opcode::PushI32.cell(), 0, Opcode::Ret.cell()]);
    assert_eq!(program.constants, vec![Value::I32(42)]);
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].name, "main");
    assert_eq!(program.functions[0].address, 0);

    let (execution, _) = run(source);
    assert_eq!(execution.into_result().unwrap(), Value::I32(42));
}

#[test]
fn call_through_raw_exec_cells() {
    let source = "\
define function @seven(none): i32 {
\tpush const i32: 7
\tret
}

define public function @main(none): i32 {
\texec 5
\texec 0
\texec 4
\thalt
}
";
    let (execution, out) = run(source);
    assert!(matches!(execution.stop, Stop::Halted));
    assert_eq!(out, "7\n");
    assert_eq!(execution.into_result().unwrap(), Value::I32(7));
}

#[test]
fn main_without_terminator_runs_off_the_end() {
    let source = "define public function @main(none): i32 {\n\tpush const i32: 3\n\tpush const i32: 4\n}\n";
    let (execution, _) = run(source);
    assert!(matches!(execution.stop, Stop::EndOfCode));
    assert_eq!(execution.into_result().unwrap(), Value::I32(4));
}

#[test]
fn halt_skips_remaining_code() {
    let source = "define public function @main(none): i32 {\n\tpush const i32: 1\n\thalt\n\texec 4\n}\n";
    let (execution, out) = run(source);
    assert!(matches!(execution.stop, Stop::Halted));
    assert!(out.is_empty());
    assert_eq!(execution.steps, 2);
}

#[test]
fn malformed_instruction_still_runs_the_rest() {
    let source = "define public function @main(none): i32 {\n\tpush const i32 9\n\tpush const i32: 8\n\tret\n}\n";
    let assembly = assemble(source);
    assert_eq!(assembly.diagnostics.len(), 1);
    assert_eq!(assembly.diagnostics[0].line, 2);

    let (execution, _) = run(source);
    assert_eq!(execution.into_result().unwrap(), Value::I32(8));
}

#[test]
fn raw_unknown_opcode_faults_at_runtime() {
    let source = "define public function @main(none): i32 {\n\tpush const i32: 1\n\texec 77\n}\n";
    let (execution, _) = run(source);
    assert!(matches!(
        execution.fault(),
        Some(RuntimeError::UnknownOpcode { cell: 77, pc: 2 })
    ));
    // the value pushed before the fault is still reported
    assert_eq!(execution.result, Some(Value::I32(1)));
}

#[test]
fn document_without_main() {
    let source = "define function @helper(none): i32 {\n\tpush const i32: 5\n}\n";
    let (execution, _) = run(source);
    assert!(matches!(execution.into_result(), Err(RuntimeError::MissingMain)));

    let config = VmConfig {
        require_main: false,
        ..VmConfig::default()
    };
    let mut vm = Vm::with_config(assemble(source).program, config);
    let mut out = Vec::new();
    let execution = vm.run_with_output(&mut out);
    assert_eq!(execution.into_result().unwrap(), Value::I32(5));
}

#[test]
fn image_round_trip_runs_identically() {
    let source = "define public function @main(none): i32 {\n\tpush const i32: 11\n\texec 4\n\tret\n}\n";
    let program = assemble(source).program;
    let bytes = program.to_bytes().unwrap();
    let restored = Program::from_bytes(&bytes).unwrap();
    assert_eq!(restored, program);

    let mut out = Vec::new();
    let execution = Vm::new(restored).run_with_output(&mut out);
    assert_eq!(out, b"11\n");
    assert_eq!(execution.into_result().unwrap(), Value::I32(11));
}

#[test]
fn garbage_image_is_rejected() {
    assert!(Program::from_bytes(&[0xff, 0xff, 0xff]).is_err());
}
