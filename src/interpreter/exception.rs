use crate::ast::Position;
use crate::interpreter::Value;

/// A thrown exception in flight, whether user-defined or `BasicException`.
/// Lives in the evaluator's `pending_exception` slot until caught.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeException {
    pub name: String,
    pub attributes: Vec<(String, Value)>,
    pub position: Position,
}

impl RuntimeException {
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// `BasicException` catches everything; a user exception only matches its
    /// own name.
    pub fn matches(&self, catch_type: &str) -> bool {
        catch_type == "BasicException" || catch_type == self.name
    }
}
