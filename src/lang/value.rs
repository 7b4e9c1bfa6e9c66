use serde::{Deserialize, Serialize};

/// Runtime value of the stack machine.
///
/// Values live in the constant pool and are copied onto the operand stack;
/// they are never shared. New variants can be added without disturbing
/// existing decode paths because every consumer matches on the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// 32-bit signed integer.
    I32(i32),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::I32(_) => "i32",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::I32(n) => write!(f, "{}", n),
        }
    }
}
