use crate::bytecode::op::Cell;
use crate::lang::value::Value;
use serde::{Deserialize, Serialize};

/// An assembled program.
///
/// All three tables are append-only while assembling and read-only while
/// executing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Packed instruction stream. Operand cells directly follow their opcode.
    pub code: Vec<Cell>,

    /// Constant pool, indexed by the operand of `PUSH_I32`. Never deduplicated.
    pub constants: Vec<Value>,

    /// Function table in definition order.
    pub functions: Vec<FunctionEntry>,
}

/// A function table entry: `address` is an absolute offset into `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    pub address: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("invalid program image: {0}")]
    Decode(postcard::Error),
    #[error("could not encode program image: {0}")]
    Encode(postcard::Error),
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constant and returns its pool index.
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Records a function starting at the current end of `code`.
    pub fn begin_function(&mut self, name: impl Into<String>) -> usize {
        let address = self.code.len();
        self.functions.push(FunctionEntry {
            name: name.into(),
            address,
        });
        address
    }

    /// Finds a function by name. With duplicate names the first one wins.
    pub fn function(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ImageError> {
        postcard::to_allocvec(self).map_err(ImageError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        postcard::from_bytes(bytes).map_err(ImageError::Decode)
    }
}
