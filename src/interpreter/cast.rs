use crate::ast::{Position, Type};
use crate::interpreter::value::format_float;
use crate::interpreter::{InterpreterError, Value};

/// Implements the `expr to T` cast table from source type `S` to target `T`.
pub fn cast(value: &Value, target: Type, position: Position) -> Result<Value, InterpreterError> {
    Ok(match (value, target) {
        (Value::Int(v), Type::Int) => Value::Int(*v),
        (Value::Int(v), Type::Float) => Value::Float(*v as f64),
        (Value::Int(v), Type::Bool) => Value::Bool(*v != 0),
        (Value::Int(v), Type::String) => Value::Str(v.to_string()),

        (Value::Float(v), Type::Int) => Value::Int(v.trunc() as i64),
        (Value::Float(v), Type::Float) => Value::Float(*v),
        (Value::Float(v), Type::Bool) => Value::Bool(*v != 0.0),
        (Value::Float(v), Type::String) => Value::Str(format_float(*v)),

        (Value::Bool(v), Type::Int) => Value::Int(if *v { 1 } else { 0 }),
        (Value::Bool(v), Type::Float) => Value::Float(if *v { 1.0 } else { 0.0 }),
        (Value::Bool(v), Type::Bool) => Value::Bool(*v),
        (Value::Bool(v), Type::String) => Value::Str(if *v { "true" } else { "false" }.to_string()),

        (Value::Str(v), Type::Int) => {
            let parsed: i64 = v.trim().parse().map_err(|_| InterpreterError::WrongExpressionType {
                position,
                got: Type::String,
                expected: Type::Int,
            })?;
            Value::Int(parsed)
        }
        (Value::Str(v), Type::Float) => {
            let parsed: f64 = v.trim().parse().map_err(|_| InterpreterError::WrongExpressionType {
                position,
                got: Type::String,
                expected: Type::Float,
            })?;
            Value::Float(parsed)
        }
        (Value::Str(v), Type::Bool) => Value::Bool(!v.is_empty()),
        (Value::Str(v), Type::String) => Value::Str(v.clone()),

        (_, Type::Void) => {
            return Err(InterpreterError::WrongExpressionType {
                position,
                got: value.type_(),
                expected: Type::Void,
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Position;

    fn pos() -> Position {
        Position::start()
    }

    #[test]
    fn int_to_string() {
        assert_eq!(cast(&Value::Int(7), Type::String, pos()).unwrap(), Value::Str("7".to_string()));
    }

    #[test]
    fn bool_to_int() {
        assert_eq!(cast(&Value::Bool(true), Type::Int, pos()).unwrap(), Value::Int(1));
        assert_eq!(cast(&Value::Bool(false), Type::Int, pos()).unwrap(), Value::Int(0));
    }

    #[test]
    fn string_empty_is_false() {
        assert_eq!(cast(&Value::Str("".to_string()), Type::Bool, pos()).unwrap(), Value::Bool(false));
        assert_eq!(cast(&Value::Str("x".to_string()), Type::Bool, pos()).unwrap(), Value::Bool(true));
    }

    #[test]
    fn float_truncates_toward_zero() {
        assert_eq!(cast(&Value::Float(-1.9), Type::Int, pos()).unwrap(), Value::Int(-1));
    }

    #[test]
    fn bad_string_to_int_errors() {
        assert!(cast(&Value::Str("not a number".to_string()), Type::Int, pos()).is_err());
    }
}
