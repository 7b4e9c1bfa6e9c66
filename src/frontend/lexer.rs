use crate::frontend::token::Token;

/// 1-based source position of a token's first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// Tokenizer for the textual IR.
///
/// Never fails: a character it does not recognise becomes an `Eof` token at
/// that position and scanning carries on after it.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_integer(&mut self) -> Token {
        let mut digits = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::Integer(digits)
    }

    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::keyword(&ident).unwrap_or(Token::Ident(ident))
    }

    fn read_symbol(&mut self) -> Token {
        let token = match self.current() {
            Some(':') => Token::Colon,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,
            Some('{') => Token::LBrace,
            Some('}') => Token::RBrace,
            Some('@') => Token::At,
            other => {
                tracing::debug!(
                    line = self.line,
                    col = self.col,
                    "unrecognized character {:?}, emitting EOF",
                    other
                );
                Token::Eof
            }
        };
        self.advance();
        token
    }

    pub fn tokenize(&mut self) -> Vec<Spanned> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let span = self.span();

            let token = match self.current() {
                None => {
                    tokens.push(Spanned {
                        token: Token::Eof,
                        span,
                    });
                    break;
                }
                Some('\n') => {
                    self.advance();
                    Token::Newline
                }
                Some(ch) if ch.is_ascii_digit() => self.read_integer(),
                Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => self.read_identifier(),
                Some(_) => self.read_symbol(),
            };

            tokens.push(Spanned { token, span });
        }

        tracing::trace!(count = tokens.len(), "tokenized IR");
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .map(|s| s.token)
            .filter(|t| !matches!(t, Token::Newline | Token::Eof))
            .collect()
    }

    fn tokens_raw(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    fn int(s: &str) -> Token {
        Token::Integer(s.to_string())
    }

    #[test]
    fn test_function_header() {
        let t = tokens("define public function @main(none): i32 {");
        assert_eq!(
            t,
            vec![
                Token::Define,
                Token::Public,
                Token::Function,
                Token::At,
                ident("main"),
                Token::LParen,
                Token::None,
                Token::RParen,
                Token::Colon,
                ident("i32"),
                Token::LBrace,
            ]
        );
    }

    #[test]
    fn test_push_const() {
        let t = tokens("\tpush const i32: 42");
        assert_eq!(
            t,
            vec![Token::Push, Token::Const, ident("i32"), Token::Colon, int("42")]
        );
    }

    #[test]
    fn test_all_keywords() {
        let t = tokens("define public function none push pop const ret exec halt");
        assert_eq!(
            t,
            vec![
                Token::Define,
                Token::Public,
                Token::Function,
                Token::None,
                Token::Push,
                Token::Pop,
                Token::Const,
                Token::Ret,
                Token::Exec,
                Token::Halt,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(tokens("RET Halt"), vec![ident("RET"), ident("Halt")]);
    }

    #[test]
    fn test_underscore_identifier() {
        assert_eq!(tokens("_start my_fn2"), vec![ident("_start"), ident("my_fn2")]);
    }

    #[test]
    fn test_newlines_are_tokens() {
        let t = tokens_raw("ret\nhalt\n");
        assert_eq!(
            t,
            vec![Token::Ret, Token::Newline, Token::Halt, Token::Newline, Token::Eof]
        );
    }

    #[test]
    fn test_multiline_body_without_layout() {
        let t = tokens("{\n\texec 4\n\tret\n}\n");
        assert_eq!(
            t,
            vec![Token::LBrace, Token::Exec, int("4"), Token::Ret, Token::RBrace]
        );
    }

    #[test]
    fn test_carriage_return_is_skipped() {
        let t = tokens_raw("ret\r\n");
        assert_eq!(t, vec![Token::Ret, Token::Newline, Token::Eof]);
    }

    #[test]
    fn test_unrecognized_character_becomes_eof_and_continues() {
        let t = tokens_raw("ret # halt");
        assert_eq!(t, vec![Token::Ret, Token::Eof, Token::Halt, Token::Eof]);
    }

    #[test]
    fn test_minus_is_not_part_of_integer() {
        let t = tokens_raw("-5");
        assert_eq!(t, vec![Token::Eof, int("5"), Token::Eof]);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(tokens_raw(""), vec![Token::Eof]);
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let spanned = Lexer::new("ret\n  halt").tokenize();
        assert_eq!(spanned[0].span, Span { line: 1, col: 1 });
        assert_eq!(spanned[1].span, Span { line: 1, col: 4 });
        assert_eq!(spanned[2].token, Token::Halt);
        assert_eq!(spanned[2].span, Span { line: 2, col: 3 });
    }

    #[test]
    fn test_digits_then_letters_split() {
        assert_eq!(tokens("42abc"), vec![int("42"), ident("abc")]);
    }
}
