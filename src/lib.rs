//! # Aster
//!
//! Assembler and execution engine for a small stack-oriented virtual machine.
//!
//! The pipeline runs one way:
//!
//! ```text
//! IR text --Lexer--> tokens --Assembler--> Program --Vm--> result
//! ```
//!
//! - [`frontend`] turns the textual IR into tokens.
//! - [`bytecode`] packs tokens into a cell stream with a constant pool and a
//!   function table, and can list or serialize the result.
//! - [`runtime`] interprets a [`bytecode::Program`] starting at `main`.

pub mod bytecode;
pub mod frontend;
pub mod lang;
pub mod runtime;

pub use bytecode::{Assembly, Program, assemble};
pub use lang::value::Value;
pub use runtime::{Execution, RuntimeError, Stop, Vm, VmConfig};
