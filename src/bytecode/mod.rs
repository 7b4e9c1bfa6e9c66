pub mod assemble;
pub mod assemble_error;
pub mod disasm;
pub mod ir;
pub mod op;

pub use assemble::{Assembler, Assembly, assemble};
pub use assemble_error::{AssembleError, AssembleErrorKind};
pub use ir::{FunctionEntry, ImageError, Program};
pub use op::{Cell, Instr, Opcode};
