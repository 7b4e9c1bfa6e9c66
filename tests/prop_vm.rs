//! Property tests for the engine:
//! 1. push then print shows exactly the stored constant, for every index
//! 2. overflowing the operand stack never disturbs the entries below the limit
//! 3. call/ret resumes after the call operand, at any call site

use aster::bytecode::{Cell, FunctionEntry, Opcode, Program};
use aster::{Stop, Value, Vm, VmConfig};
use proptest::prelude::*;

fn main_program(code: Vec<Cell>, constants: Vec<i32>) -> Program {
    Program {
        code,
        constants: constants.into_iter().map(Value::I32).collect(),
        functions: vec![FunctionEntry {
            name: "main".to_string(),
            address: 0,
        }],
    }
}

fn run(vm: &mut Vm) -> (aster::Execution, String) {
    let mut out = Vec::new();
    let execution = vm.run_with_output(&mut out);
    (execution, String::from_utf8(out).unwrap())
}

proptest! {
    #[test]
    fn push_then_print_shows_constant(
        constants in prop::collection::vec(any::<i32>(), 1..64),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(constants.len());
        let code = vec![Opcode::PushI32.cell(), index as Cell, Opcode::Print.cell()];
        let mut vm = Vm::new(main_program(code, constants.clone()));
        let (execution, out) = run(&mut vm);

        prop_assert_eq!(out, format!("{}\n", constants[index]));
        prop_assert_eq!(execution.into_result().unwrap(), Value::I32(constants[index]));
    }

    #[test]
    fn overflow_preserves_lower_entries(limit in 1usize..64, extra in 1usize..8) {
        let total = limit + extra;
        let mut code = Vec::new();
        for i in 0..total {
            code.extend([Opcode::PushI32.cell(), i as Cell]);
        }
        let constants: Vec<i32> = (0..total as i32).collect();
        let config = VmConfig { max_stack_size: limit, ..VmConfig::default() };
        let mut vm = Vm::with_config(main_program(code, constants), config);
        let (execution, _) = run(&mut vm);

        prop_assert!(execution.is_fault());
        prop_assert_eq!(vm.stack().len(), limit);
        for (i, v) in vm.stack().iter().enumerate() {
            prop_assert_eq!(*v, Value::I32(i as i32));
        }
    }

    #[test]
    fn ret_resumes_after_call_operand(padding in 0usize..16, value in any::<i32>()) {
        // main: EXEC * padding; CALL 1; PRINT; HALT    f: PUSH 0; RET
        let mut code = vec![Opcode::Exec.cell(); padding];
        code.extend([Opcode::Call.cell(), 1, Opcode::Print.cell(), Opcode::Halt.cell()]);
        let f_address = code.len();
        code.extend([Opcode::PushI32.cell(), 0, Opcode::Ret.cell()]);

        let mut program = main_program(code, vec![value]);
        program.functions.push(FunctionEntry { name: "f".to_string(), address: f_address });

        let mut vm = Vm::new(program);
        let (execution, out) = run(&mut vm);

        prop_assert!(matches!(execution.stop, Stop::Halted));
        prop_assert_eq!(out, format!("{}\n", value));
        // HALT is the cell right after PRINT, which follows the call operand
        prop_assert_eq!(vm.pc(), padding + 4);
    }
}
