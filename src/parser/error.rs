use thiserror::Error;

use crate::ast::Position;
use crate::lexer::TokenKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParserError {
    #[error("Unexpected token {got:?}, expected {expected} at {position}")]
    UnexpectedToken {
        position: Position,
        got: TokenKind,
        expected: String,
    },

    #[error("Expected a simple type after {after} at {position}")]
    ExpectedSimpleType { position: Position, after: String },

    #[error("Expected an expression after operator {after_operator} at {position}")]
    ExpectedExpression {
        position: Position,
        after_operator: String,
    },

    #[error("Expected an attribute block in declaration of {in_decl} at {position}")]
    ExpectedAttributes { position: Position, in_decl: String },

    #[error("Expected a parameter at {position}")]
    ExpectedParameter { position: Position },

    #[error("Expected a condition after {keyword} at {position}")]
    ExpectedCondition { position: Position, keyword: String },

    #[error("Expected a statement block {where_} at {position}")]
    ExpectedStatementBlock { position: Position, where_: String },

    #[error("Unknown type {got} at {position}")]
    UnknownType { position: Position, got: String },

    #[error("Expected a function or exception declaration at {position}")]
    ExpectedDeclaration { position: Position },

    #[error("Duplicate declaration of {name} at {position}")]
    DuplicateDeclaration { position: Position, name: String },
}

impl ParserError {
    pub fn position(&self) -> Position {
        match self {
            ParserError::UnexpectedToken { position, .. }
            | ParserError::ExpectedSimpleType { position, .. }
            | ParserError::ExpectedExpression { position, .. }
            | ParserError::ExpectedAttributes { position, .. }
            | ParserError::ExpectedParameter { position }
            | ParserError::ExpectedCondition { position, .. }
            | ParserError::ExpectedStatementBlock { position, .. }
            | ParserError::UnknownType { position, .. }
            | ParserError::ExpectedDeclaration { position }
            | ParserError::DuplicateDeclaration { position, .. } => *position,
        }
    }
}
