use crate::bytecode::ir::Program;
use crate::bytecode::op::{Cell, Opcode};
use crate::lang::value::Value;
use crate::runtime::runtime_error::RuntimeError;
use std::io::{self, Write};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Operand stack capacity. Pushing past it is a fault, never a resize.
    pub max_stack_size: usize,
    /// Call stack capacity, including the sentinel frame pushed for `main`.
    pub max_call_depth: usize,
    /// Fault at startup when no `main` exists. When false, execution starts
    /// at address 0 with an empty call stack.
    pub require_main: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            max_stack_size: 1024,
            max_call_depth: 1024,
            require_main: true,
        }
    }
}

/// Why the fetch-decode-execute loop stopped.
#[derive(Debug)]
pub enum Stop {
    /// A `HALT` instruction was executed.
    Halted,
    /// `pc` reached the end of the code, including by returning from `main`.
    EndOfCode,
    Fault(RuntimeError),
}

/// Outcome of one program run.
#[derive(Debug)]
pub struct Execution {
    pub stop: Stop,
    /// Top of the operand stack once the loop exited, if any.
    pub result: Option<Value>,
    /// Number of instructions dispatched.
    pub steps: usize,
}

impl Execution {
    pub fn is_fault(&self) -> bool {
        matches!(self.stop, Stop::Fault(_))
    }

    pub fn fault(&self) -> Option<&RuntimeError> {
        match &self.stop {
            Stop::Fault(e) => Some(e),
            _ => None,
        }
    }

    /// The program's result: the fault if there was one, otherwise the top of
    /// the operand stack. An empty stack is reported as `EmptyResult`.
    pub fn into_result(self) -> Result<Value, RuntimeError> {
        match self.stop {
            Stop::Fault(e) => Err(e),
            Stop::Halted | Stop::EndOfCode => self.result.ok_or(RuntimeError::EmptyResult),
        }
    }
}

enum Flow {
    Continue,
    Halt,
}

/// Stack machine executing an assembled [`Program`].
pub struct Vm {
    program: Program,
    config: VmConfig,
    pc: usize,
    running: bool,
    stack: Vec<Value>,
    call_stack: Vec<usize>,
    steps: usize,
}

impl Vm {
    pub fn new(program: Program) -> Self {
        Self::with_config(program, VmConfig::default())
    }

    pub fn with_config(program: Program, config: VmConfig) -> Self {
        Self {
            stack: Vec::with_capacity(config.max_stack_size),
            call_stack: Vec::with_capacity(config.max_call_depth),
            program,
            config,
            pc: 0,
            running: true,
            steps: 0,
        }
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn call_stack(&self) -> &[usize] {
        &self.call_stack
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn reset_execution_state(&mut self) {
        self.pc = 0;
        self.running = true;
        self.steps = 0;
        self.stack.clear();
        self.call_stack.clear();
    }

    /// Runs the program, printing to stdout.
    pub fn run(&mut self) -> Execution {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out)
    }

    /// Runs the program from `main`, writing `PRINT` output to `out`.
    pub fn run_with_output(&mut self, out: &mut impl Write) -> Execution {
        self.reset_execution_state();

        if let Err(fault) = self.enter_main() {
            return self.finish(Stop::Fault(fault));
        }

        let mut stop = Stop::EndOfCode;

        while self.running && self.pc < self.program.code.len() {
            self.steps += 1;

            match self.step(out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Halt) => {
                    self.running = false;
                    stop = Stop::Halted;
                }
                Err(fault) => {
                    self.running = false;
                    stop = Stop::Fault(fault);
                }
            }
        }

        self.finish(stop)
    }

    fn enter_main(&mut self) -> Result<(), RuntimeError> {
        match self.program.function("main").map(|f| f.address) {
            Some(address) => {
                // returning from main lands exactly on the end of the code
                self.push_frame(self.program.code.len())?;
                self.pc = address;
                debug!(address, "entering main");
                Ok(())
            }
            None if self.config.require_main => Err(RuntimeError::MissingMain),
            None => {
                warn!("no 'main' function, starting at address 0");
                Ok(())
            }
        }
    }

    fn finish(&mut self, stop: Stop) -> Execution {
        self.running = false;

        match &stop {
            Stop::Fault(fault) => error!(%fault, pc = self.pc, "execution fault"),
            Stop::Halted => info!(pc = self.pc, "program halted"),
            Stop::EndOfCode => debug!(pc = self.pc, "reached end of code"),
        }

        Execution {
            stop,
            result: self.stack.last().copied(),
            steps: self.steps,
        }
    }

    // Execution

    fn step(&mut self, out: &mut impl Write) -> Result<Flow, RuntimeError> {
        let at = self.pc;
        let cell = self.program.code[at];

        let Some(opcode) = Opcode::from_cell(cell) else {
            return Err(RuntimeError::UnknownOpcode { cell, pc: at });
        };

        self.pc += 1;

        match opcode {
            Opcode::PushI32 => {
                if self.stack.len() >= self.config.max_stack_size {
                    return Err(RuntimeError::StackOverflow {
                        pc: at,
                        limit: self.config.max_stack_size,
                    });
                }
                let index = self.operand(opcode, at)?;
                let value = self.constant(index, at)?;
                self.stack.push(value);
            }
            Opcode::Ret => {
                let address = self
                    .call_stack
                    .pop()
                    .ok_or(RuntimeError::CallStackUnderflow { pc: at })?;
                self.pc = address;
            }
            Opcode::Exec => {}
            Opcode::Halt => return Ok(Flow::Halt),
            Opcode::Print => {
                let top = self
                    .stack
                    .last()
                    .ok_or(RuntimeError::StackUnderflow { op: "PRINT", pc: at })?;
                writeln!(out, "{}", top)?;
            }
            Opcode::Call => {
                let index = self.operand(opcode, at)?;
                let address = self.function_address(index, at)?;
                // self.pc already points past the operand
                self.push_frame(self.pc).map_err(|_| RuntimeError::CallStackOverflow {
                    pc: at,
                    limit: self.config.max_call_depth,
                })?;
                self.pc = address;
            }
            Opcode::Jmp => return Err(RuntimeError::UnknownOpcode { cell, pc: at }),
        }

        Ok(Flow::Continue)
    }

    /// Reads the operand cell at `pc` and moves past it.
    fn operand(&mut self, opcode: Opcode, at: usize) -> Result<Cell, RuntimeError> {
        let cell = self
            .program
            .code
            .get(self.pc)
            .copied()
            .ok_or(RuntimeError::TruncatedInstruction {
                opcode: opcode.mnemonic(),
                pc: at,
            })?;
        self.pc += 1;
        Ok(cell)
    }

    fn constant(&self, index: Cell, at: usize) -> Result<Value, RuntimeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.program.constants.get(i))
            .copied()
            .ok_or(RuntimeError::BadConstant {
                index,
                pc: at,
                len: self.program.constants.len(),
            })
    }

    fn function_address(&self, index: Cell, at: usize) -> Result<usize, RuntimeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.program.functions.get(i))
            .map(|f| f.address)
            .ok_or(RuntimeError::BadFunction {
                index,
                pc: at,
                len: self.program.functions.len(),
            })
    }

    fn push_frame(&mut self, return_address: usize) -> Result<(), RuntimeError> {
        if self.call_stack.len() >= self.config.max_call_depth {
            return Err(RuntimeError::CallStackOverflow {
                pc: self.pc,
                limit: self.config.max_call_depth,
            });
        }
        self.call_stack.push(return_address);
        Ok(())
    }
}
