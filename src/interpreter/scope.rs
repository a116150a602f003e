use std::collections::HashMap;

use crate::interpreter::Value;

/// One lexical scope: a flat name→value map, plus (for exception bindings
/// introduced by `catch`) a secondary attribute map keyed by the bound name.
#[derive(Debug, Default)]
pub struct Scope {
    variables: HashMap<String, Value>,
    /// `(binding_name, attr_name) -> value`, populated only by `catch`.
    exception_attrs: HashMap<(String, String), Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn declare(&mut self, name: String, value: Value) {
        self.variables.insert(name, value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn bind_exception_attr(&mut self, binding: &str, attr: &str, value: Value) {
        self.exception_attrs
            .insert((binding.to_string(), attr.to_string()), value);
    }

    pub fn exception_attr(&self, binding: &str, attr: &str) -> Option<&Value> {
        self.exception_attrs
            .get(&(binding.to_string(), attr.to_string()))
    }

    pub fn has_exception_binding(&self, binding: &str) -> bool {
        self.exception_attrs.keys().any(|(b, _)| b == binding)
    }
}

/// An activation record for one function invocation. Always has at least one
/// scope — the function's root scope holding its parameters.
#[derive(Debug)]
pub struct CallFrame {
    pub function_name: String,
    pub scopes: Vec<Scope>,
}

impl CallFrame {
    pub fn new(function_name: String) -> Self {
        Self {
            function_name,
            scopes: vec![Scope::new()],
        }
    }

    /// Build a frame whose root scope is pre-populated (used for exception
    /// parameter binding, which happens outside any function call).
    pub fn with_scope(function_name: String, scope: Scope) -> Self {
        Self {
            function_name,
            scopes: vec![scope],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Look up a variable from innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    /// Look up an exception attribute binding from innermost scope outward.
    pub fn lookup_exception_attr(&self, binding: &str, attr: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.exception_attr(binding, attr))
    }

    pub fn has_exception_binding(&self, binding: &str) -> bool {
        self.scopes.iter().any(|s| s.has_exception_binding(binding))
    }

    /// Assign to an existing binding anywhere in this frame; returns false if
    /// no such binding exists (caller should then declare it fresh).
    pub fn assign_existing(&mut self, name: &str, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if scope.contains(name) {
                scope.set(name, value);
                return true;
            }
        }
        false
    }

    pub fn declare_in_innermost(&mut self, name: String, value: Value) {
        self.scopes
            .last_mut()
            .expect("call frame always has a scope")
            .declare(name, value);
    }

    pub fn innermost_declares(&self, name: &str) -> bool {
        self.scopes
            .last()
            .map(|s| s.contains(name))
            .unwrap_or(false)
    }
}
