use tracing::{debug, trace};

use crate::bytecode::assemble_error::{AssembleError, AssembleErrorKind};
use crate::bytecode::ir::Program;
use crate::bytecode::op::{Cell, Instr};
use crate::frontend::lexer::{Lexer, Span, Spanned};
use crate::frontend::token::Token;
use crate::lang::value::Value;

type Step<T> = Result<T, AssembleError>;

/// Result of assembling one IR document.
///
/// `program` is always usable, even when `diagnostics` is not empty: every
/// abandoned construct simply contributes nothing (or a truncated prefix).
#[derive(Debug, Clone)]
pub struct Assembly {
    pub program: Program,
    pub diagnostics: Vec<AssembleError>,
}

impl Assembly {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Single-pass assembler from IR tokens to packed cells.
///
/// Grammar:
///
/// ```text
/// unit        := { definition | <any other token, skipped> }
/// definition  := "define" ["public"] "function" "@" IDENT
///                "(" ["none"] ")" ":" IDENT "{" NEWLINE
///                { instruction } "}" NEWLINE
/// instruction := "push" "const" IDENT ":" INTEGER
///              | "ret" | "halt" | "exec" INTEGER
/// ```
pub struct Assembler {
    tokens: Vec<Spanned>,
    pos: usize,
    program: Program,
    diagnostics: Vec<AssembleError>,
}

impl Assembler {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            pos: 0,
            program: Program::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn from_source(source: &str) -> Self {
        Self::new(Lexer::new(source).tokenize())
    }

    pub fn assemble(mut self) -> Assembly {
        while let Some(token) = self.current() {
            match token {
                Token::Define => {
                    if let Err(e) = self.definition() {
                        self.report(e);
                    }
                }
                _ => self.advance(),
            }
        }

        debug!(
            cells = self.program.code.len(),
            constants = self.program.constants.len(),
            functions = self.program.functions.len(),
            diagnostics = self.diagnostics.len(),
            "assembled program"
        );

        Assembly {
            program: self.program,
            diagnostics: self.diagnostics,
        }
    }

    // Token cursor

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Span of the current token, or of the last one once input is exhausted.
    fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|s| s.span)
            .unwrap_or(Span { line: 1, col: 1 })
    }

    fn check(&self, kind: &Token) -> bool {
        self.current().is_some_and(|t| t.same_kind(kind))
    }

    /// Consumes the current token if it is of `kind`.
    fn eat(&mut self, kind: &Token) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of `kind`, or reports what was there instead without
    /// consuming it.
    fn expect(&mut self, kind: &Token, what: &str) -> Step<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Step<String> {
        match self.current() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_integer(&mut self, what: &str) -> Step<String> {
        match self.current() {
            Some(Token::Integer(digits)) => {
                let digits = digits.clone();
                self.advance();
                Ok(digits)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn unexpected(&self, what: &str) -> AssembleError {
        let found = match self.current() {
            None | Some(Token::Eof) => "end of input".to_string(),
            Some(Token::Newline) => "newline".to_string(),
            Some(t) => format!("{} '{}'", t.kind_name(), t),
        };
        AssembleError::unexpected(what, found, self.span())
    }

    fn report(&mut self, err: AssembleError) {
        debug!(%err, "abandoned IR construct");
        self.diagnostics.push(err);
    }

    fn emit(&mut self, instr: Instr) {
        trace!(at = self.program.code.len(), ?instr, "emit");
        instr.encode_into(&mut self.program.code);
    }

    // Grammar

    fn definition(&mut self) -> Step<()> {
        self.advance(); // define
        self.eat(&Token::Public);
        self.expect(&Token::Function, "'function'")?;
        self.expect(&Token::At, "'@'")?;
        let name = self.expect_ident("function name")?;
        self.expect(&Token::LParen, "'('")?;
        self.eat(&Token::None);
        self.expect(&Token::RParen, "')'")?;
        self.expect(&Token::Colon, "':'")?;
        let return_type = self.expect_ident("return type")?;

        let address = self.program.begin_function(name.as_str());
        debug!(function = %name, address, %return_type, "function entry");

        self.expect(&Token::LBrace, "'{'")?;
        self.expect(&Token::Newline, "newline after '{'")?;

        loop {
            match self.current() {
                None => {
                    return Err(AssembleError::new(
                        AssembleErrorKind::UnterminatedBody { function: name },
                        self.span(),
                    ));
                }
                Some(Token::RBrace) => break,
                Some(_) => {
                    if let Err(e) = self.instruction() {
                        self.report(e);
                    }
                }
            }
        }
        self.advance(); // }

        // the last definition may end the document without a newline
        match self.current() {
            Some(Token::Newline) => {
                self.advance();
                Ok(())
            }
            None | Some(Token::Eof) => Ok(()),
            Some(_) => Err(self.unexpected("newline after '}'")),
        }
    }

    fn instruction(&mut self) -> Step<()> {
        match self.current() {
            Some(Token::Push) => self.push(),
            Some(Token::Ret) => {
                self.advance();
                self.emit(Instr::Ret);
                Ok(())
            }
            Some(Token::Halt) => {
                self.advance();
                self.emit(Instr::Halt);
                Ok(())
            }
            Some(Token::Exec) => self.exec(),
            _ => {
                self.advance();
                Ok(())
            }
        }
    }

    fn push(&mut self) -> Step<()> {
        self.advance(); // push
        self.expect(&Token::Const, "'const'")?;
        let type_tag = self.expect_ident("type name")?;
        self.expect(&Token::Colon, "':'")?;
        let span = self.span();
        let literal = self.expect_integer("integer literal")?;

        let n: i32 = literal.parse().map_err(|_| {
            AssembleError::new(
                AssembleErrorKind::IntegerOutOfRange {
                    literal: literal.clone(),
                    target: "i32",
                },
                span,
            )
        })?;

        // only the i32 variant exists, so the declared tag is not checked
        trace!(%type_tag, value = n, "push const");
        let constant = self.program.add_constant(Value::I32(n)) as Cell;
        self.emit(Instr::PushI32 { constant });
        Ok(())
    }

    fn exec(&mut self) -> Step<()> {
        self.advance(); // exec
        let span = self.span();
        let literal = self.expect_integer("opcode number")?;

        let cell: Cell = literal.parse().map_err(|_| {
            AssembleError::new(
                AssembleErrorKind::IntegerOutOfRange {
                    literal: literal.clone(),
                    target: "an instruction cell",
                },
                span,
            )
        })?;

        self.emit(Instr::Raw(cell));
        Ok(())
    }
}

/// Tokenizes and assembles an IR document.
pub fn assemble(source: &str) -> Assembly {
    Assembler::from_source(source).assemble()
}
