use crate::bytecode::op::Cell;

/// An execution-time fault. Once raised, the engine stops and never resumes.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("operand stack overflow at {pc:04} (limit {limit})")]
    StackOverflow { pc: usize, limit: usize },

    #[error("operand stack underflow on {op} at {pc:04}")]
    StackUnderflow { op: &'static str, pc: usize },

    #[error("call stack overflow at {pc:04} (limit {limit})")]
    CallStackOverflow { pc: usize, limit: usize },

    #[error("call stack underflow on RET at {pc:04}")]
    CallStackUnderflow { pc: usize },

    #[error("unrecognized opcode {cell} at {pc:04}")]
    UnknownOpcode { cell: Cell, pc: usize },

    #[error("{opcode} at {pc:04} is missing its operand cell")]
    TruncatedInstruction { opcode: &'static str, pc: usize },

    #[error("constant index {index} out of range at {pc:04} (pool has {len})")]
    BadConstant { index: Cell, pc: usize, len: usize },

    #[error("function index {index} out of range at {pc:04} (table has {len})")]
    BadFunction { index: Cell, pc: usize, len: usize },

    #[error("program has no function named 'main'")]
    MissingMain,

    #[error("operand stack is empty at exit, no result to report")]
    EmptyResult,

    #[error("could not write program output: {0}")]
    Output(#[from] std::io::Error),
}
