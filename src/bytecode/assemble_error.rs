use crate::frontend::lexer::Span;

/// Why an IR construct was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleErrorKind {
    /// A token of the wrong kind where the grammar needed something else.
    #[error("expected {expected}, found {found}")]
    Unexpected { expected: String, found: String },

    /// An integer literal that does not fit the 32-bit slot it is written into.
    #[error("integer literal {literal} does not fit in {target}")]
    IntegerOutOfRange {
        literal: String,
        target: &'static str,
    },

    /// Token stream ended inside a function body.
    #[error("function '{function}' is missing its closing '}}'")]
    UnterminatedBody { function: String },
}

/// An assembly diagnostic with source location.
///
/// Diagnostics never stop assembly: the construct that produced one is
/// dropped and the assembler resumes at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{col}: {kind}")]
pub struct AssembleError {
    pub kind: AssembleErrorKind,
    pub line: usize,
    pub col: usize,
}

impl AssembleError {
    pub fn new(kind: AssembleErrorKind, span: Span) -> Self {
        Self {
            kind,
            line: span.line,
            col: span.col,
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        Self::new(
            AssembleErrorKind::Unexpected {
                expected: expected.into(),
                found: found.into(),
            },
            span,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_has_location_prefix() {
        let err = AssembleError::unexpected("':'", "integer literal '4'", Span { line: 2, col: 17 });
        assert_eq!(err.to_string(), "2:17: expected ':', found integer literal '4'");
    }

    #[test]
    fn test_unterminated_body_message() {
        let err = AssembleError::new(
            AssembleErrorKind::UnterminatedBody {
                function: "main".to_string(),
            },
            Span { line: 4, col: 1 },
        );
        assert_eq!(err.to_string(), "4:1: function 'main' is missing its closing '}'");
    }
}
