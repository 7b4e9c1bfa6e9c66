/// One integer-sized unit of the instruction stream: an opcode or an operand.
pub type Cell = i32;

// =============================================================================
// OPCODE - numbering of the packed instruction stream
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Push `constants[operand]`.
    PushI32,
    /// Pop a return address and jump to it.
    Ret,
    /// Placeholder opcode; executes as a no-op.
    Exec,
    Halt,
    /// Display the top of the operand stack without popping it.
    Print,
    /// Call `functions[operand]`.
    Call,
    /// Reserved. Listed by the disassembler, has no execution handler.
    Jmp,
}

impl Opcode {
    pub const ALL: [Opcode; 7] = [
        Opcode::PushI32,
        Opcode::Ret,
        Opcode::Exec,
        Opcode::Halt,
        Opcode::Print,
        Opcode::Call,
        Opcode::Jmp,
    ];

    pub fn from_cell(cell: Cell) -> Option<Opcode> {
        Some(match cell {
            0 => Opcode::PushI32,
            1 => Opcode::Ret,
            2 => Opcode::Exec,
            3 => Opcode::Halt,
            4 => Opcode::Print,
            5 => Opcode::Call,
            6 => Opcode::Jmp,
            _ => return None,
        })
    }

    pub fn cell(self) -> Cell {
        match self {
            Opcode::PushI32 => 0,
            Opcode::Ret => 1,
            Opcode::Exec => 2,
            Opcode::Halt => 3,
            Opcode::Print => 4,
            Opcode::Call => 5,
            Opcode::Jmp => 6,
        }
    }

    /// Number of operand cells that follow the opcode cell.
    pub fn operand_count(self) -> usize {
        match self {
            Opcode::PushI32 | Opcode::Call | Opcode::Jmp => 1,
            Opcode::Ret | Opcode::Exec | Opcode::Halt | Opcode::Print => 0,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::PushI32 => "PUSH_I32",
            Opcode::Ret => "RET",
            Opcode::Exec => "EXEC",
            Opcode::Halt => "HALT",
            Opcode::Print => "PRINT",
            Opcode::Call => "CALL",
            Opcode::Jmp => "JMP",
        }
    }
}

// =============================================================================
// INSTR - what the assembler emits
// =============================================================================

/// An instruction as produced by the assembler, before packing into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// `push const <type>: <int>`; operand is a constant pool index.
    PushI32 { constant: Cell },
    Ret,
    Halt,

    /// `exec <int>`: the integer becomes the opcode cell verbatim, with no
    /// operand and no check that it names a known opcode.
    Raw(Cell),
}

impl Instr {
    /// Appends the packed form of this instruction to `code`.
    pub fn encode_into(self, code: &mut Vec<Cell>) {
        match self {
            Instr::PushI32 { constant } => {
                code.push(Opcode::PushI32.cell());
                code.push(constant);
            }
            Instr::Ret => code.push(Opcode::Ret.cell()),
            Instr::Halt => code.push(Opcode::Halt.cell()),
            Instr::Raw(cell) => code.push(cell),
        }
    }
}
