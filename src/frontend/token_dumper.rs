use std::io::{self, Write};

use crate::frontend::lexer::Spanned;
use crate::frontend::token::Token;

pub struct TokenDumper {
    pub color: bool,
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self { color: true }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn dump(&self, tokens: &[Spanned]) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_to(&mut out, tokens)
    }

    pub fn write_to(&self, out: &mut impl Write, tokens: &[Spanned]) -> io::Result<()> {
        for s in tokens {
            self.write_one(out, s)?;
        }
        Ok(())
    }

    fn write_one(&self, out: &mut impl Write, s: &Spanned) -> io::Result<()> {
        let colr = if self.color { self.color(&s.token) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        writeln!(
            out,
            "[{:02}:{:02}] {}{:<8} {}{}",
            s.span.line,
            s.span.col,
            colr,
            self.kind(&s.token),
            s.token,
            reset
        )
    }

    fn kind(&self, t: &Token) -> &'static str {
        use Token::*;
        match t {
            Newline => "NEWLINE",
            Eof => "EOF",
            Integer(_) => "INT",
            Ident(_) => "IDENT",
            Colon | LParen | RParen | LBrace | RBrace | At => "SYMBOL",
            _ => "KEYWORD",
        }
    }

    fn color(&self, t: &Token) -> &'static str {
        use Token::*;
        match t {
            Newline | Eof => Self::DIM,
            Integer(_) => Self::CYN,
            Ident(_) => Self::YEL,
            Colon | LParen | RParen | LBrace | RBrace | At => Self::MAG,
            _ => Self::RESET,
        }
    }
}
