/// A lexical unit of the textual IR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Keywords
    Define,
    Public,
    Function,
    None,
    Push,
    Pop,
    Const,
    Ret,
    Exec,
    Halt,

    // Symbols
    Colon,  // :
    LParen, // (
    RParen, // )
    LBrace, // {
    RBrace, // }
    At,     // @

    // Identifier (function names, type tags)
    Ident(String),

    // Integer literal, kept as written; range checks happen in the assembler
    Integer(String),

    // Special
    Newline,
    Eof,
}

impl Token {
    /// Looks up a keyword by exact, case-sensitive match.
    pub fn keyword(ident: &str) -> Option<Token> {
        Some(match ident {
            "define" => Token::Define,
            "public" => Token::Public,
            "function" => Token::Function,
            "none" => Token::None,
            "push" => Token::Push,
            "pop" => Token::Pop,
            "const" => Token::Const,
            "ret" => Token::Ret,
            "exec" => Token::Exec,
            "halt" => Token::Halt,
            _ => return None,
        })
    }

    /// Short, stable name of the token kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Define
            | Token::Public
            | Token::Function
            | Token::None
            | Token::Push
            | Token::Pop
            | Token::Const
            | Token::Ret
            | Token::Exec
            | Token::Halt => "keyword",
            Token::Colon
            | Token::LParen
            | Token::RParen
            | Token::LBrace
            | Token::RBrace
            | Token::At => "symbol",
            Token::Ident(_) => "identifier",
            Token::Integer(_) => "integer literal",
            Token::Newline => "newline",
            Token::Eof => "end of input",
        }
    }

    /// Returns true if both tokens are of the same kind, ignoring payloads.
    pub fn same_kind(&self, other: &Token) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Define => write!(f, "define"),
            Token::Public => write!(f, "public"),
            Token::Function => write!(f, "function"),
            Token::None => write!(f, "none"),
            Token::Push => write!(f, "push"),
            Token::Pop => write!(f, "pop"),
            Token::Const => write!(f, "const"),
            Token::Ret => write!(f, "ret"),
            Token::Exec => write!(f, "exec"),
            Token::Halt => write!(f, "halt"),
            Token::Colon => write!(f, ":"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::At => write!(f, "@"),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Integer(s) => write!(f, "{}", s),
            Token::Newline => write!(f, "\\n"),
            Token::Eof => write!(f, "EOF"),
        }
    }
}
