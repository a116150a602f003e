use thiserror::Error;

use crate::ast::{Position, Type};

/// Fatal interpreter errors. These are not catchable by the language's own
/// `try`/`catch` — they abort the running program with a diagnostic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpreterError {
    #[error("No function named 'main' was found")]
    MissingMain,

    #[error("Undefined variable '{name}' at {position}")]
    UndefinedVariable { position: Position, name: String },

    #[error("Variable '{name}' is already declared in this scope at {position}")]
    VariableAlreadyDeclared { position: Position, name: String },

    #[error("Unknown function '{name}' at {position}")]
    UnknownFunctionCall { position: Position, name: String },

    #[error("Wrong expression type: got {got}, expected {expected} at {position}")]
    WrongExpressionType {
        position: Position,
        got: Type,
        expected: Type,
    },

    #[error("Division by zero at {position}")]
    DivisionByZero { position: Position },

    #[error("Types do not match in binary operation: {left} vs {right} at {position}")]
    NotMatchingTypesInBinary {
        position: Position,
        left: Type,
        right: Type,
    },

    #[error("Returned value has the wrong type: got {got}, expected {expected} at {position}")]
    InvalidReturnedValueType {
        position: Position,
        got: Type,
        expected: Type,
    },

    #[error("Recursion too deep at {position}")]
    RecursionTooDeep { position: Position },

    #[error("Undefined exception '{name}' at {position}")]
    UndefinedException { position: Position, name: String },

    #[error("'{kind}' used outside of a loop at {position}")]
    LoopControlOutsideLoop { position: Position, kind: String },

    #[error("Undefined attribute '{attr}' on '{holder}' at {position}")]
    UndefinedAttribute {
        position: Position,
        attr: String,
        holder: String,
    },

    #[error("A void function's result was used as a value at {position}")]
    VoidFunctionUsedAsValue { position: Position },

    #[error("Wrong number of arguments for '{name}': expected {expected}, got {got} at {position}")]
    WrongNumberOfArguments {
        position: Position,
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Attribute '{attr}' is already declared on '{holder}' at {position}")]
    AttributeAlreadyDeclared {
        position: Position,
        attr: String,
        holder: String,
    },

    #[error("Void function '{name}' returned a value at {position}")]
    ValueReturnInVoidFunction { position: Position, name: String },

    #[error("Function '{name}' is missing a return statement at {position}")]
    ReturnStatementMissing { position: Position, name: String },

    #[error("Value overflow: {value} at {position}")]
    ValueOverflow { position: Position, value: String },
}

impl InterpreterError {
    pub fn position(&self) -> Option<Position> {
        match self {
            InterpreterError::MissingMain => None,
            InterpreterError::UndefinedVariable { position, .. }
            | InterpreterError::VariableAlreadyDeclared { position, .. }
            | InterpreterError::UnknownFunctionCall { position, .. }
            | InterpreterError::WrongExpressionType { position, .. }
            | InterpreterError::DivisionByZero { position }
            | InterpreterError::NotMatchingTypesInBinary { position, .. }
            | InterpreterError::InvalidReturnedValueType { position, .. }
            | InterpreterError::RecursionTooDeep { position }
            | InterpreterError::UndefinedException { position, .. }
            | InterpreterError::LoopControlOutsideLoop { position, .. }
            | InterpreterError::UndefinedAttribute { position, .. }
            | InterpreterError::VoidFunctionUsedAsValue { position }
            | InterpreterError::WrongNumberOfArguments { position, .. }
            | InterpreterError::AttributeAlreadyDeclared { position, .. }
            | InterpreterError::ValueReturnInVoidFunction { position, .. }
            | InterpreterError::ReturnStatementMissing { position, .. }
            | InterpreterError::ValueOverflow { position, .. } => Some(*position),
        }
    }
}
