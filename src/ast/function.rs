use crate::ast::{Block, Parameter, Position, Type};

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub position: Position,
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Type,
    pub body: Block,
}
