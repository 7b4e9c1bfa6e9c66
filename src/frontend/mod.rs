//! Textual IR front end: tokens, the tokenizer, and a token listing.

pub mod lexer;
pub mod token;
pub mod token_dumper;

pub use lexer::{Lexer, Span, Spanned};
pub use token::Token;
