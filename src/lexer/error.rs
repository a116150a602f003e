use thiserror::Error;

use crate::ast::Position;

/// Errors the lexer can raise. All of them abort scanning immediately — the
/// lexer never attempts to recover and resume producing tokens past one of
/// these (see §7 of the originating specification).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Number too big: should be less than or equal to {max} at {0}", max = i64::MAX)]
    NumberOverflow(Position),

    #[error("Identifier name too long: should be less than or equal to 128 characters at {0}")]
    IdentifierTooLong(Position),

    #[error("String literal too long: should be less than 3000 characters at {0}")]
    StringTooLong(Position),

    #[error("Comment too long: should be less than 3000 characters at {0}")]
    CommentTooLong(Position),

    #[error("Unexpected escape character '{1}' at {0}")]
    BadEscape(Position, char),

    #[error("Unterminated string literal at {0}")]
    UnterminatedString(Position),

    #[error("Precision too high: should be less than or equal to 15 digits at {0}")]
    PrecisionTooHigh(Position),

    #[error("Unknown token '{1}' at {0}")]
    UnknownToken(Position, char),

    #[error("Unterminated comment block at {0}")]
    UnterminatedComment(Position),
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::NumberOverflow(p)
            | LexError::IdentifierTooLong(p)
            | LexError::StringTooLong(p)
            | LexError::CommentTooLong(p)
            | LexError::BadEscape(p, _)
            | LexError::UnterminatedString(p)
            | LexError::PrecisionTooHigh(p)
            | LexError::UnknownToken(p, _)
            | LexError::UnterminatedComment(p) => *p,
        }
    }
}
