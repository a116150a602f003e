use thiserror::Error;

use crate::interpreter::{EvalOutcome, InterpreterError, RuntimeException};
use crate::lexer::LexError;
use crate::parser::ParserError;

/// Top-level error, unifying every stage that can fail.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParserError),

    #[error(transparent)]
    Interpreter(#[from] InterpreterError),

    #[error(
        "Uncaught exception {name} at {position}: {msg}",
        name = .0.name,
        position = .0.position,
        msg = message(.0)
    )]
    Uncaught(RuntimeException),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

fn message(exc: &RuntimeException) -> String {
    exc.attr("message")
        .map(|v| v.to_string())
        .unwrap_or_default()
}

impl From<EvalOutcome> for Error {
    fn from(outcome: EvalOutcome) -> Self {
        match outcome {
            EvalOutcome::Fatal(e) => Error::Interpreter(e),
            EvalOutcome::Uncaught(exc) => Error::Uncaught(exc),
        }
    }
}
