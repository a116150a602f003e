use std::fmt::{self, Display};

use crate::ast::Type;

/// A runtime value. Tagged union, not a boxed object — dispatch on the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn type_(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Bool(_) => Type::Bool,
            Value::Str(_) => Type::String,
        }
    }
}

/// Renders a float as decimal text, always keeping a `.0` for whole numbers
/// (`2.0`, not `2`) so casts and prints agree with the language's numeric text.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::Bool(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            Value::Str(v) => write!(f, "{v}"),
        }
    }
}
