use std::io::{self, BufRead, Write};

use crate::ast::Position;
use crate::interpreter::{RuntimeException, Value};

pub const PRINT: &str = "print";
pub const INPUT: &str = "input";
pub const BASIC_EXCEPTION: &str = "BasicException";

pub fn is_builtin_function(name: &str) -> bool {
    name == PRINT || name == INPUT
}

/// `print(args…)`: space-separated, newline-terminated, returns no value.
pub fn print(args: &[Value], out: &mut impl Write) -> io::Result<()> {
    let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    writeln!(out, "{}", rendered.join(" "))
}

/// `input()`: reads one line from standard input, stripped of its newline.
pub fn input(reader: &mut impl BufRead) -> io::Result<String> {
    let mut line = std::string::String::new();
    reader.read_line(&mut line)?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(line)
}

/// Builds the builtin `BasicException(message)` with position and message
/// attributes, in that order, matching the contract in §4.3.
pub fn basic_exception(message: String, position: Position) -> RuntimeException {
    RuntimeException {
        name: BASIC_EXCEPTION.to_string(),
        attributes: vec![
            ("position".to_string(), Value::Str(position.to_string())),
            ("message".to_string(), Value::Str(message)),
        ],
        position,
    }
}
