use std::fmt::{self, Display};

/// A location within a source file, 1-indexed on both axes.
///
/// Every token, AST node and runtime error carries one of these so that any
/// diagnostic can be traced back to where it originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn start() -> Self {
        Self::new(1, 1)
    }

    /// Advance within the current line.
    pub fn advance_column(&mut self) {
        self.column += 1;
    }

    /// Move to the first column of the next line.
    pub fn advance_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}, Column {}", self.line, self.column)
    }
}
