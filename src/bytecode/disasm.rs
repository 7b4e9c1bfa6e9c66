use crate::bytecode::ir::Program;
use crate::bytecode::op::{Cell, Opcode};
use crate::frontend::lexer::Spanned;
use std::collections::HashMap;

/// One decoded instruction of a packed cell stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A known opcode with its operand, if it takes one.
    Op {
        at: usize,
        opcode: Opcode,
        operand: Option<Cell>,
    },
    /// A cell that is not a known opcode (typically from `exec <int>`).
    Unknown { at: usize, cell: Cell },
    /// A known opcode whose operand cell is past the end of the stream.
    Truncated { at: usize, opcode: Opcode },
}

impl Decoded {
    pub fn at(&self) -> usize {
        match self {
            Decoded::Op { at, .. } | Decoded::Unknown { at, .. } | Decoded::Truncated { at, .. } => {
                *at
            }
        }
    }
}

/// Decodes a cell stream front to back, the same way the engine walks it.
pub fn decode(code: &[Cell]) -> Vec<Decoded> {
    let mut out = Vec::new();
    let mut at = 0;

    while at < code.len() {
        let cell = code[at];
        match Opcode::from_cell(cell) {
            None => {
                out.push(Decoded::Unknown { at, cell });
                at += 1;
            }
            Some(opcode) if opcode.operand_count() == 0 => {
                out.push(Decoded::Op {
                    at,
                    opcode,
                    operand: None,
                });
                at += 1;
            }
            Some(opcode) => match code.get(at + 1) {
                Some(operand) => {
                    out.push(Decoded::Op {
                        at,
                        opcode,
                        operand: Some(*operand),
                    });
                    at += 2;
                }
                None => {
                    out.push(Decoded::Truncated { at, opcode });
                    at += 1;
                }
            },
        }
    }

    out
}

// =============================================================================
// String output
// =============================================================================

fn header(name: &str, count: usize) -> String {
    format!("=== {} ({}) ===\n", name, count)
}

fn footer(name: &str, count: usize) -> String {
    format!("=== End {} ({}) ===\n", name, count)
}

/// Token listing, one token per line.
pub fn tokens_to_string(tokens: &[Spanned]) -> String {
    let mut output = header("Lexer Output", tokens.len());

    for (i, s) in tokens.iter().enumerate() {
        output.push_str(&format!(
            "[{}] {}: '{}' (Line: {}, Column: {})\n",
            i,
            s.token.kind_name(),
            s.token,
            s.span.line,
            s.span.col
        ));
    }

    output.push_str(&footer("Lexer Output", tokens.len()));
    output
}

/// Instruction listing. Function entry points are marked with their name.
pub fn disassemble_to_string(program: &Program) -> String {
    let mut output = header("Assembler Output", program.code.len());

    for d in decode(&program.code) {
        for f in program.functions.iter().filter(|f| f.address == d.at()) {
            output.push_str(&format!("      ┌── @{}\n", f.name));
        }

        output.push_str(&format!("{:04}  ", d.at()));
        output.push_str(&format_decoded(program, &d));
        output.push('\n');
    }

    output.push_str(&footer("Assembler Output", program.code.len()));
    output
}

fn format_decoded(program: &Program, d: &Decoded) -> String {
    match *d {
        Decoded::Op {
            opcode: Opcode::PushI32,
            operand: Some(index),
            ..
        } => {
            let annotation = usize::try_from(index)
                .ok()
                .and_then(|i| program.constants.get(i))
                .map(|v| format!("; {} {}", v.type_name(), v))
                .unwrap_or_else(|| "; <no such constant>".to_string());
            format!("{:<12}{:<8} {}", Opcode::PushI32.mnemonic(), index, annotation)
        }
        Decoded::Op {
            opcode: Opcode::Call,
            operand: Some(index),
            ..
        } => {
            let annotation = usize::try_from(index)
                .ok()
                .and_then(|i| program.functions.get(i))
                .map(|f| format!("; @{} (→ {:04})", f.name, f.address))
                .unwrap_or_else(|| "; <no such function>".to_string());
            format!("{:<12}{:<8} {}", Opcode::Call.mnemonic(), index, annotation)
        }
        Decoded::Op {
            opcode,
            operand: Some(operand),
            ..
        } => format!("{:<12}{}", opcode.mnemonic(), operand),
        Decoded::Op {
            opcode,
            operand: None,
            ..
        } => opcode.mnemonic().to_string(),
        Decoded::Unknown { cell, .. } => format!("{:<12}{}", "???", cell),
        Decoded::Truncated { opcode, .. } => {
            format!("{:<12}; missing operand", opcode.mnemonic())
        }
    }
}

pub fn functions_to_string(program: &Program) -> String {
    let count = program.functions.len();
    let mut output = header("Function Table", count);

    for f in &program.functions {
        output.push_str(&format!(
            "Function: '{}' at address: {}\n",
            f.name, f.address
        ));
    }

    output.push_str(&footer("Function Table", count));
    output
}

pub fn constants_to_string(program: &Program) -> String {
    let count = program.constants.len();
    let mut output = header("Constant Pool", count);

    for (i, v) in program.constants.iter().enumerate() {
        output.push_str(&format!("[{}] {} {}\n", i, v.type_name(), v));
    }

    output.push_str(&footer("Constant Pool", count));
    output
}

/// Full debug dump: instructions, function table, constant pool.
pub fn print_bc(program: &Program) {
    print!("{}", disassemble_to_string(program));
    print!("{}", functions_to_string(program));
    print!("{}", constants_to_string(program));
}

pub fn print_tokens(tokens: &[Spanned]) {
    print!("{}", tokens_to_string(tokens));
}

// =============================================================================
// Statistics
// =============================================================================

/// Print instruction statistics
pub fn print_bc_stats(program: &Program) {
    println!("=== BYTECODE STATISTICS ===\n");

    let decoded = decode(&program.code);

    println!("Cells:            {}", program.code.len());
    println!("Instructions:     {}", decoded.len());
    println!("Constants:        {}", program.constants.len());
    println!("Functions:        {}", program.functions.len());
    println!();

    let mut op_counts: HashMap<&str, usize> = HashMap::new();
    for d in &decoded {
        let name = match d {
            Decoded::Op { opcode, .. } | Decoded::Truncated { opcode, .. } => opcode.mnemonic(),
            Decoded::Unknown { .. } => "???",
        };
        *op_counts.entry(name).or_insert(0) += 1;
    }

    println!("Op frequency:");
    let mut counts: Vec<_> = op_counts.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    for (op, count) in counts {
        let pct = (*count as f64 / decoded.len() as f64) * 100.0;
        println!("  {:<14} {:>4} ({:>5.1}%)", op, count, pct);
    }
}
