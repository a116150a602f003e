pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;

use std::io::{BufRead, Write};

pub use config::Config;
pub use error::Error;

use ast::Program;
use interpreter::Evaluator;
use parser::Parser;

/// Parses and runs `source`, reading `input()` calls from `stdin` and
/// writing `print()` output to `stdout`.
pub fn run(source: &str, config: &Config, stdin: impl BufRead, stdout: impl Write) -> Result<(), Error> {
    let program = Parser::new(source)?.get_program()?;
    run_program(program, config, stdin, stdout)
}

/// Runs an already-parsed [`Program`], reading `input()` calls from `stdin`
/// and writing `print()` output to `stdout`.
pub fn run_program(
    program: Program,
    config: &Config,
    stdin: impl BufRead,
    stdout: impl Write,
) -> Result<(), Error> {
    let mut evaluator = Evaluator::new(
        program,
        config.recursion_limit,
        config.number_precision,
        stdin,
        stdout,
    );
    evaluator.run()?;
    Ok(())
}

/// Convenience entry point for tests: runs `source` against a fixed `stdin`
/// string, returning whatever was written to `stdout`.
pub fn run_str_with_stdin(source: &str, stdin: &str) -> Result<String, Error> {
    let reader = std::io::BufReader::new(std::io::Cursor::new(stdin.to_string()));
    let mut out = Vec::new();
    run(source, &Config::default(), reader, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Convenience entry point for tests with no stdin interaction.
pub fn run_str(source: &str) -> Result<String, Error> {
    run_str_with_stdin(source, "")
}
