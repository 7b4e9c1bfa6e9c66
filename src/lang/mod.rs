//! Values shared by the assembler and the execution engine.

pub mod value;
