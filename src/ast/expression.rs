use crate::ast::{Position, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// An expression node. Every variant carries the position of its leading
/// token so runtime errors can point back at source.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    IntLit {
        position: Position,
        value: i64,
    },
    FloatLit {
        position: Position,
        value: f64,
    },
    BoolLit {
        position: Position,
        value: bool,
    },
    StringLit {
        position: Position,
        value: String,
    },
    Variable {
        position: Position,
        name: String,
    },
    AttrAccess {
        position: Position,
        var_name: String,
        attr_name: String,
    },
    Call {
        position: Position,
        name: String,
        args: Vec<Expression>,
    },
    Unary {
        position: Position,
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        position: Position,
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    And {
        position: Position,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Or {
        position: Position,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Cast {
        position: Position,
        expr: Box<Expression>,
        target: Type,
    },
}

impl Expression {
    pub fn position(&self) -> Position {
        match self {
            Expression::IntLit { position, .. }
            | Expression::FloatLit { position, .. }
            | Expression::BoolLit { position, .. }
            | Expression::StringLit { position, .. }
            | Expression::Variable { position, .. }
            | Expression::AttrAccess { position, .. }
            | Expression::Call { position, .. }
            | Expression::Unary { position, .. }
            | Expression::Binary { position, .. }
            | Expression::And { position, .. }
            | Expression::Or { position, .. }
            | Expression::Cast { position, .. } => *position,
        }
    }
}
