mod builtins;
mod cast;
mod error;
mod exception;
mod scope;
mod value;

pub use error::InterpreterError;
pub use exception::RuntimeException;
pub use scope::{CallFrame, Scope};
pub use value::Value;

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::rc::Rc;

use log::debug;

use crate::ast::{
    BinaryOp, Block, CatchClause, ElifBranch, ExceptionDef, Expression, Function, Position,
    Program, Statement, Type, UnaryOp,
};

pub const DEFAULT_RECURSION_LIMIT: usize = 30;
pub const DEFAULT_NUMBER_PRECISION: u32 = 15;

/// Outcome of running a program to completion.
#[derive(Debug)]
pub enum EvalOutcome {
    /// A fatal, non-catchable interpreter error.
    Fatal(InterpreterError),
    /// A user or builtin exception escaped `main` uncaught.
    Uncaught(RuntimeException),
}

#[derive(Default)]
struct Flags {
    brk: bool,
    cont: bool,
    ret: bool,
}

/// Walks a [`Program`]'s AST directly. Owns one call stack, one pending
/// exception slot, and the I/O streams `print`/`input` read and write.
pub struct Evaluator<R, W> {
    functions: HashMap<String, Rc<Function>>,
    exceptions: HashMap<String, Rc<ExceptionDef>>,
    call_stack: Vec<CallFrame>,
    last_result: Option<Value>,
    flags: Flags,
    pending_exception: Option<RuntimeException>,
    recursion_limit: usize,
    number_precision: u32,
    stdin: R,
    stdout: W,
}

impl<R: BufRead, W: Write> Evaluator<R, W> {
    pub fn new(
        program: Program,
        recursion_limit: usize,
        number_precision: u32,
        stdin: R,
        stdout: W,
    ) -> Self {
        let functions = program
            .functions
            .into_iter()
            .map(|(k, v)| (k, Rc::new(v)))
            .collect();
        let exceptions = program
            .exceptions
            .into_iter()
            .map(|(k, v)| (k, Rc::new(v)))
            .collect();
        Self {
            functions,
            exceptions,
            call_stack: Vec::new(),
            last_result: None,
            flags: Flags::default(),
            pending_exception: None,
            recursion_limit,
            number_precision,
            stdin,
            stdout,
        }
    }

    /// Validates `main` exists, then synthesizes a zero-argument call to it.
    pub fn run(&mut self) -> Result<(), EvalOutcome> {
        if !self.functions.contains_key("main") {
            return Err(EvalOutcome::Fatal(InterpreterError::MissingMain));
        }
        debug!("starting evaluation at main");
        if let Err(e) = self.call_function(Position::start(), "main", &[]) {
            return Err(EvalOutcome::Fatal(e));
        }
        if let Some(exc) = self.pending_exception.take() {
            return Err(EvalOutcome::Uncaught(exc));
        }
        Ok(())
    }

    fn frame_mut(&mut self) -> &mut CallFrame {
        self.call_stack
            .last_mut()
            .expect("evaluator always runs within a call frame")
    }

    // --- statements ---

    fn exec_block(&mut self, block: &Block) -> Result<(), InterpreterError> {
        self.frame_mut().push_scope();
        let result = self.exec_statements(&block.statements);
        self.frame_mut().pop_scope();
        result
    }

    fn exec_statements(&mut self, statements: &[Statement]) -> Result<(), InterpreterError> {
        for stmt in statements {
            self.exec_statement(stmt)?;
            if self.flags.brk || self.flags.cont || self.flags.ret || self.pending_exception.is_some()
            {
                break;
            }
        }
        Ok(())
    }

    fn exec_statement(&mut self, stmt: &Statement) -> Result<(), InterpreterError> {
        self.last_result = None;
        match stmt {
            Statement::Block(b) => self.exec_block(b),
            Statement::If {
                condition,
                then_block,
                elifs,
                else_block,
                ..
            } => self.exec_if(condition, then_block, elifs, else_block),
            Statement::While { condition, body, .. } => self.exec_while(condition, body),
            Statement::Break { .. } => {
                self.flags.brk = true;
                Ok(())
            }
            Statement::Continue { .. } => {
                self.flags.cont = true;
                Ok(())
            }
            Statement::Assignment {
                position,
                name,
                value,
            } => self.exec_assignment(*position, name, value),
            Statement::Call {
                position,
                name,
                args,
            } => {
                self.call_function(*position, name, args)?;
                self.last_result = None;
                Ok(())
            }
            Statement::Return { position, value } => self.exec_return(*position, value.as_ref()),
            Statement::TryCatch {
                try_block, catches, ..
            } => self.exec_try_catch(try_block, catches),
            Statement::Throw {
                position,
                name,
                args,
            } => self.exec_throw(*position, name, args),
        }
    }

    fn exec_if(
        &mut self,
        condition: &Expression,
        then_block: &Block,
        elifs: &[ElifBranch],
        else_block: &Option<Block>,
    ) -> Result<(), InterpreterError> {
        let v = self.eval_value(condition)?;
        if self.pending_exception.is_some() {
            return Ok(());
        }
        if self.expect_bool(v, condition.position())? {
            return self.exec_block(then_block);
        }
        for elif in elifs {
            let v = self.eval_value(&elif.condition)?;
            if self.pending_exception.is_some() {
                return Ok(());
            }
            if self.expect_bool(v, elif.condition.position())? {
                return self.exec_block(&elif.block);
            }
        }
        if let Some(eb) = else_block {
            return self.exec_block(eb);
        }
        Ok(())
    }

    fn exec_while(&mut self, condition: &Expression, body: &Block) -> Result<(), InterpreterError> {
        loop {
            let v = self.eval_value(condition)?;
            if self.pending_exception.is_some() {
                return Ok(());
            }
            if !self.expect_bool(v, condition.position())? {
                break;
            }
            self.exec_block(body)?;
            if self.pending_exception.is_some() || self.flags.ret {
                break;
            }
            if self.flags.brk {
                self.flags.brk = false;
                break;
            }
            if self.flags.cont {
                self.flags.cont = false;
            }
        }
        Ok(())
    }

    fn exec_assignment(
        &mut self,
        position: Position,
        name: &str,
        expr: &Expression,
    ) -> Result<(), InterpreterError> {
        let value = self.eval_value(expr)?;
        if self.pending_exception.is_some() {
            return Ok(());
        }
        let existing_type = self.frame_mut().lookup(name).map(|v| v.type_());
        match existing_type {
            Some(t) if t != value.type_() => Err(InterpreterError::WrongExpressionType {
                position,
                got: value.type_(),
                expected: t,
            }),
            Some(_) => {
                self.frame_mut().assign_existing(name, value);
                Ok(())
            }
            None => {
                self.frame_mut().declare_in_innermost(name.to_string(), value);
                Ok(())
            }
        }
    }

    fn exec_return(
        &mut self,
        _position: Position,
        value: Option<&Expression>,
    ) -> Result<(), InterpreterError> {
        match value {
            Some(expr) => {
                let v = self.eval_value(expr)?;
                if self.pending_exception.is_some() {
                    return Ok(());
                }
                self.last_result = Some(v);
            }
            None => self.last_result = None,
        }
        self.flags.ret = true;
        Ok(())
    }

    fn exec_try_catch(
        &mut self,
        try_block: &Block,
        catches: &[CatchClause],
    ) -> Result<(), InterpreterError> {
        self.exec_block(try_block)?;
        let Some(exc) = self.pending_exception.clone() else {
            return Ok(());
        };
        for catch in catches {
            if !exc.matches(&catch.exception_name) {
                continue;
            }
            self.pending_exception = None;
            self.frame_mut().push_scope();
            for (attr_name, value) in &exc.attributes {
                self.frame_mut()
                    .scopes
                    .last_mut()
                    .expect("scope just pushed")
                    .bind_exception_attr(&catch.binding, attr_name, value.clone());
            }
            let result = self.exec_statements(&catch.body.statements);
            self.frame_mut().pop_scope();
            return result;
        }
        Ok(())
    }

    fn exec_throw(
        &mut self,
        position: Position,
        name: &str,
        args: &[Expression],
    ) -> Result<(), InterpreterError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_value(arg)?);
            if self.pending_exception.is_some() {
                return Ok(());
            }
        }

        // A user-defined `exception BasicException(...)` takes priority over the
        // builtin of the same name — only fall back to the synthesized builtin
        // when no such declaration exists.
        let exc_def = match self.exceptions.get(name).cloned() {
            Some(def) => def,
            None if name == builtins::BASIC_EXCEPTION => {
                let message = values
                    .into_iter()
                    .next()
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                self.pending_exception = Some(builtins::basic_exception(message, position));
                return Ok(());
            }
            None => {
                return Err(InterpreterError::UndefinedException {
                    position,
                    name: name.to_string(),
                })
            }
        };

        if values.len() != exc_def.params.len() {
            return Err(InterpreterError::WrongNumberOfArguments {
                position,
                name: name.to_string(),
                expected: exc_def.params.len(),
                got: values.len(),
            });
        }

        let mut scope = Scope::new();
        for (param, value) in exc_def.params.iter().zip(values.into_iter()) {
            if value.type_() != param.type_ {
                return Err(InterpreterError::WrongExpressionType {
                    position: param.position,
                    got: value.type_(),
                    expected: param.type_,
                });
            }
            if scope.contains(&param.name) {
                return Err(InterpreterError::VariableAlreadyDeclared {
                    position: param.position,
                    name: param.name.clone(),
                });
            }
            scope.declare(param.name.clone(), value);
        }

        self.call_stack
            .push(CallFrame::with_scope(format!("<exception:{name}>"), scope));

        let mut attrs = Vec::with_capacity(exc_def.attributes.len());
        for attr in &exc_def.attributes {
            if self.frame_mut().innermost_declares(&attr.name) {
                self.call_stack.pop();
                return Err(InterpreterError::AttributeAlreadyDeclared {
                    position: attr.position,
                    attr: attr.name.clone(),
                    holder: name.to_string(),
                });
            }
            let value = match self.eval_value(&attr.initializer) {
                Ok(v) => v,
                Err(e) => {
                    self.call_stack.pop();
                    return Err(e);
                }
            };
            if value.type_() != attr.type_ {
                self.call_stack.pop();
                return Err(InterpreterError::WrongExpressionType {
                    position: attr.position,
                    got: value.type_(),
                    expected: attr.type_,
                });
            }
            self.frame_mut()
                .declare_in_innermost(attr.name.clone(), value.clone());
            attrs.push((attr.name.clone(), value));
        }
        self.call_stack.pop();

        attrs.push(("position".to_string(), Value::Str(position.to_string())));
        self.pending_exception = Some(RuntimeException {
            name: name.to_string(),
            attributes: attrs,
            position,
        });
        Ok(())
    }

    // --- expressions ---

    fn eval_value(&mut self, expr: &Expression) -> Result<Value, InterpreterError> {
        self.eval_expression(expr)?;
        self.take_result(expr.position())
    }

    fn take_result(&mut self, position: Position) -> Result<Value, InterpreterError> {
        self.last_result
            .take()
            .ok_or(InterpreterError::VoidFunctionUsedAsValue { position })
    }

    fn expect_bool(&self, value: Value, position: Position) -> Result<bool, InterpreterError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(InterpreterError::WrongExpressionType {
                position,
                got: other.type_(),
                expected: Type::Bool,
            }),
        }
    }

    fn eval_expression(&mut self, expr: &Expression) -> Result<(), InterpreterError> {
        match expr {
            Expression::IntLit { value, .. } => {
                self.last_result = Some(Value::Int(*value));
                Ok(())
            }
            Expression::FloatLit { value, .. } => {
                self.last_result = Some(Value::Float(*value));
                Ok(())
            }
            Expression::BoolLit { value, .. } => {
                self.last_result = Some(Value::Bool(*value));
                Ok(())
            }
            Expression::StringLit { value, .. } => {
                self.last_result = Some(Value::Str(value.clone()));
                Ok(())
            }
            Expression::Variable { position, name } => {
                let value = self
                    .frame_mut()
                    .lookup(name)
                    .cloned()
                    .ok_or(InterpreterError::UndefinedVariable {
                        position: *position,
                        name: name.clone(),
                    })?;
                self.last_result = Some(value);
                Ok(())
            }
            Expression::AttrAccess {
                position,
                var_name,
                attr_name,
            } => {
                let frame = self.frame_mut();
                if !frame.has_exception_binding(var_name) {
                    return Err(InterpreterError::UndefinedVariable {
                        position: *position,
                        name: var_name.clone(),
                    });
                }
                let value = frame
                    .lookup_exception_attr(var_name, attr_name)
                    .cloned()
                    .ok_or(InterpreterError::UndefinedAttribute {
                        position: *position,
                        attr: attr_name.clone(),
                        holder: var_name.clone(),
                    })?;
                self.last_result = Some(value);
                Ok(())
            }
            Expression::Call {
                position,
                name,
                args,
            } => self.call_function(*position, name, args),
            Expression::Unary {
                position,
                op,
                operand,
            } => self.eval_unary(*position, *op, operand),
            Expression::Binary {
                position,
                op,
                left,
                right,
            } => self.eval_binary(*position, *op, left, right),
            Expression::And { position, left, right } => self.eval_and(*position, left, right),
            Expression::Or { position, left, right } => self.eval_or(*position, left, right),
            Expression::Cast {
                position,
                expr,
                target,
            } => {
                let v = self.eval_value(expr)?;
                if self.pending_exception.is_some() {
                    return Ok(());
                }
                let casted = cast::cast(&v, *target, *position)?;
                self.last_result = Some(casted);
                Ok(())
            }
        }
    }

    fn eval_unary(
        &mut self,
        position: Position,
        op: UnaryOp,
        operand: &Expression,
    ) -> Result<(), InterpreterError> {
        let v = self.eval_value(operand)?;
        if self.pending_exception.is_some() {
            return Ok(());
        }
        let value = match (op, v) {
            (UnaryOp::Neg, Value::Int(n)) => {
                Value::Int(n.checked_neg().ok_or(InterpreterError::ValueOverflow {
                    position,
                    value: n.to_string(),
                })?)
            }
            (UnaryOp::Neg, Value::Float(f)) => Value::Float(-f),
            (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
            (UnaryOp::Neg, other) => {
                return Err(InterpreterError::WrongExpressionType {
                    position,
                    got: other.type_(),
                    expected: Type::Int,
                })
            }
            (UnaryOp::Not, other) => {
                return Err(InterpreterError::WrongExpressionType {
                    position,
                    got: other.type_(),
                    expected: Type::Bool,
                })
            }
        };
        self.last_result = Some(value);
        Ok(())
    }

    fn eval_and(
        &mut self,
        position: Position,
        left: &Expression,
        right: &Expression,
    ) -> Result<(), InterpreterError> {
        let l = self.eval_value(left)?;
        if self.pending_exception.is_some() {
            return Ok(());
        }
        if !self.expect_bool(l, position)? {
            self.last_result = Some(Value::Bool(false));
            return Ok(());
        }
        let r = self.eval_value(right)?;
        if self.pending_exception.is_some() {
            return Ok(());
        }
        let rb = self.expect_bool(r, position)?;
        self.last_result = Some(Value::Bool(rb));
        Ok(())
    }

    fn eval_or(
        &mut self,
        position: Position,
        left: &Expression,
        right: &Expression,
    ) -> Result<(), InterpreterError> {
        let l = self.eval_value(left)?;
        if self.pending_exception.is_some() {
            return Ok(());
        }
        if self.expect_bool(l, position)? {
            self.last_result = Some(Value::Bool(true));
            return Ok(());
        }
        let r = self.eval_value(right)?;
        if self.pending_exception.is_some() {
            return Ok(());
        }
        let rb = self.expect_bool(r, position)?;
        self.last_result = Some(Value::Bool(rb));
        Ok(())
    }

    fn eval_binary(
        &mut self,
        position: Position,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
    ) -> Result<(), InterpreterError> {
        let l = self.eval_value(left)?;
        if self.pending_exception.is_some() {
            return Ok(());
        }
        let r = self.eval_value(right)?;
        if self.pending_exception.is_some() {
            return Ok(());
        }
        let value = self.apply_binary(position, op, l, r)?;
        self.last_result = Some(value);
        Ok(())
    }

    fn apply_binary(
        &self,
        position: Position,
        op: BinaryOp,
        l: Value,
        r: Value,
    ) -> Result<Value, InterpreterError> {
        use BinaryOp::*;
        match op {
            Plus => match (&l, &r) {
                (Value::Int(a), Value::Int(b)) => {
                    a.checked_add(*b)
                        .map(Value::Int)
                        .ok_or(InterpreterError::ValueOverflow {
                            position,
                            value: format!("{a} + {b}"),
                        })
                }
                (Value::Float(a), Value::Float(b)) => {
                    Ok(Value::Float(self.round(a + b)))
                }
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
                _ if l.type_() == r.type_() => Err(InterpreterError::WrongExpressionType {
                    position,
                    got: l.type_(),
                    expected: Type::Int,
                }),
                _ => Err(InterpreterError::NotMatchingTypesInBinary {
                    position,
                    left: l.type_(),
                    right: r.type_(),
                }),
            },
            Minus | Mul | Div | Mod => self.numeric_binary(position, op, l, r),
            Eq | Ne => {
                if l.type_() != r.type_() {
                    return Err(InterpreterError::NotMatchingTypesInBinary {
                        position,
                        left: l.type_(),
                        right: r.type_(),
                    });
                }
                let eq = l == r;
                Ok(Value::Bool(if op == Eq { eq } else { !eq }))
            }
            Lt | Le | Gt | Ge => self.relational(position, op, l, r),
        }
    }

    fn numeric_binary(
        &self,
        position: Position,
        op: BinaryOp,
        l: Value,
        r: Value,
    ) -> Result<Value, InterpreterError> {
        if l.type_() != r.type_() {
            return Err(InterpreterError::NotMatchingTypesInBinary {
                position,
                left: l.type_(),
                right: r.type_(),
            });
        }
        match (l, r) {
            (Value::Int(a), Value::Int(b)) => self.int_op(position, op, a, b),
            (Value::Float(a), Value::Float(b)) => self.float_op(position, op, a, b),
            (other, _) => Err(InterpreterError::WrongExpressionType {
                position,
                got: other.type_(),
                expected: Type::Int,
            }),
        }
    }

    fn int_op(&self, position: Position, op: BinaryOp, a: i64, b: i64) -> Result<Value, InterpreterError> {
        match op {
            BinaryOp::Minus => a
                .checked_sub(b)
                .map(Value::Int)
                .ok_or(InterpreterError::ValueOverflow {
                    position,
                    value: format!("{a} - {b}"),
                }),
            BinaryOp::Mul => a
                .checked_mul(b)
                .map(Value::Int)
                .ok_or(InterpreterError::ValueOverflow {
                    position,
                    value: format!("{a} * {b}"),
                }),
            BinaryOp::Div => {
                if b == 0 {
                    return Err(InterpreterError::DivisionByZero { position });
                }
                Ok(Value::Int(floor_div(a, b)))
            }
            BinaryOp::Mod => {
                if b == 0 {
                    return Err(InterpreterError::DivisionByZero { position });
                }
                Ok(Value::Int(floor_mod(a, b)))
            }
            _ => unreachable!("int_op only handles Minus/Mul/Div/Mod"),
        }
    }

    fn float_op(&self, position: Position, op: BinaryOp, a: f64, b: f64) -> Result<Value, InterpreterError> {
        let result = match op {
            BinaryOp::Minus => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => {
                if b == 0.0 {
                    return Err(InterpreterError::DivisionByZero { position });
                }
                a / b
            }
            BinaryOp::Mod => {
                if b == 0.0 {
                    return Err(InterpreterError::DivisionByZero { position });
                }
                a % b
            }
            _ => unreachable!("float_op only handles Minus/Mul/Div/Mod"),
        };
        if result.is_infinite() {
            return Err(InterpreterError::ValueOverflow {
                position,
                value: result.to_string(),
            });
        }
        Ok(Value::Float(self.round(result)))
    }

    fn relational(&self, position: Position, op: BinaryOp, l: Value, r: Value) -> Result<Value, InterpreterError> {
        if l.type_() != r.type_() {
            return Err(InterpreterError::NotMatchingTypesInBinary {
                position,
                left: l.type_(),
                right: r.type_(),
            });
        }
        if matches!(l, Value::Bool(_)) {
            return Err(InterpreterError::WrongExpressionType {
                position,
                got: Type::Bool,
                expected: Type::Int,
            });
        }
        use std::cmp::Ordering::*;
        let ordering = match (&l, &r) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Equal),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => unreachable!("Bool already rejected, remaining cases share a type"),
        };
        let result = match op {
            BinaryOp::Lt => ordering == Less,
            BinaryOp::Le => ordering != Greater,
            BinaryOp::Gt => ordering == Greater,
            BinaryOp::Ge => ordering != Less,
            _ => unreachable!("relational only handles Lt/Le/Gt/Ge"),
        };
        Ok(Value::Bool(result))
    }

    fn round(&self, v: f64) -> f64 {
        let factor = 10f64.powi(self.number_precision as i32);
        (v * factor).round() / factor
    }

    // --- calls ---

    fn call_function(
        &mut self,
        position: Position,
        name: &str,
        args: &[Expression],
    ) -> Result<(), InterpreterError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_value(arg)?);
            if self.pending_exception.is_some() {
                self.last_result = None;
                return Ok(());
            }
        }

        if let Some(func) = self.functions.get(name).cloned() {
            return self.invoke_user_function(position, &func, values);
        }
        if builtins::is_builtin_function(name) {
            return self.invoke_builtin(name, values);
        }
        Err(InterpreterError::UnknownFunctionCall {
            position,
            name: name.to_string(),
        })
    }

    fn invoke_builtin(&mut self, name: &str, args: Vec<Value>) -> Result<(), InterpreterError> {
        match name {
            builtins::PRINT => {
                let _ = builtins::print(&args, &mut self.stdout);
                self.last_result = None;
                Ok(())
            }
            builtins::INPUT => {
                let line = builtins::input(&mut self.stdin).unwrap_or_default();
                self.last_result = Some(Value::Str(line));
                Ok(())
            }
            _ => unreachable!("is_builtin_function gated this call"),
        }
    }

    fn invoke_user_function(
        &mut self,
        position: Position,
        func: &Rc<Function>,
        args: Vec<Value>,
    ) -> Result<(), InterpreterError> {
        if args.len() != func.params.len() {
            return Err(InterpreterError::WrongNumberOfArguments {
                position,
                name: func.name.clone(),
                expected: func.params.len(),
                got: args.len(),
            });
        }
        if self.call_stack.len() >= self.recursion_limit {
            return Err(InterpreterError::RecursionTooDeep { position });
        }

        let mut frame = CallFrame::new(func.name.clone());
        for (param, value) in func.params.iter().zip(args.into_iter()) {
            if value.type_() != param.type_ {
                return Err(InterpreterError::WrongExpressionType {
                    position: param.position,
                    got: value.type_(),
                    expected: param.type_,
                });
            }
            if frame.innermost_declares(&param.name) {
                return Err(InterpreterError::VariableAlreadyDeclared {
                    position: param.position,
                    name: param.name.clone(),
                });
            }
            frame.declare_in_innermost(param.name.clone(), value);
        }
        self.call_stack.push(frame);
        self.last_result = None;

        if let Err(e) = self.exec_block(&func.body) {
            self.call_stack.pop();
            return Err(e);
        }

        if self.flags.brk || self.flags.cont {
            let kind = if self.flags.brk { "break" } else { "continue" };
            self.flags.brk = false;
            self.flags.cont = false;
            self.call_stack.pop();
            return Err(InterpreterError::LoopControlOutsideLoop {
                position,
                kind: kind.to_string(),
            });
        }

        if self.pending_exception.is_some() {
            self.call_stack.pop();
            self.last_result = None;
            return Ok(());
        }

        if self.flags.ret {
            self.flags.ret = false;
            match func.return_type {
                Type::Void => {
                    if self.last_result.is_some() {
                        self.call_stack.pop();
                        return Err(InterpreterError::ValueReturnInVoidFunction {
                            position,
                            name: func.name.clone(),
                        });
                    }
                }
                expected => {
                    let value = self.last_result.take().ok_or(
                        InterpreterError::ReturnStatementMissing {
                            position,
                            name: func.name.clone(),
                        },
                    )?;
                    if value.type_() != expected {
                        self.call_stack.pop();
                        return Err(InterpreterError::InvalidReturnedValueType {
                            position,
                            got: value.type_(),
                            expected,
                        });
                    }
                    self.last_result = Some(value);
                }
            }
        } else {
            match func.return_type {
                Type::Void => self.last_result = None,
                _ => {
                    self.call_stack.pop();
                    return Err(InterpreterError::ReturnStatementMissing {
                        position,
                        name: func.name.clone(),
                    });
                }
            }
        }

        self.call_stack.pop();
        Ok(())
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use std::io::{BufReader, Cursor};

    fn run(src: &str, stdin: &str) -> Result<String, EvalOutcome> {
        let program = Parser::new(src).unwrap().get_program().unwrap();
        let mut out = Vec::new();
        let reader = BufReader::new(Cursor::new(stdin.to_string()));
        let mut eval = Evaluator::new(
            program,
            DEFAULT_RECURSION_LIMIT,
            DEFAULT_NUMBER_PRECISION,
            reader,
            &mut out,
        );
        eval.run()?;
        Ok(std::string::String::from_utf8(out).unwrap())
    }

    #[test]
    fn prints_mixed_arguments() {
        let out = run(r#"void main() { print(8, 1.5, "text", true); }"#, "").unwrap();
        assert_eq!(out, "8 1.5 text true\n");
    }

    #[test]
    fn while_with_continue_and_modulo() {
        let src = r#"
            void main() {
                x = 5;
                while (x > 0) {
                    if (x % 2 == 0) { x = x - 1; continue; }
                    print(x);
                    x = x - 1;
                }
            }
        "#;
        let out = run(src, "").unwrap();
        assert_eq!(out, "5\n3\n1\n");
    }

    #[test]
    fn recursive_fib_with_input_cast() {
        let src = r#"
            int fib(int n) { if (n < 3) { return 1; } return fib(n-2)+fib(n-1); }
            void main(){ print(fib(input() to int)); }
        "#;
        let out = run(src, "10").unwrap();
        assert_eq!(out, "55\n");
    }

    #[test]
    fn user_exception_caught_as_basic() {
        let src = r#"
            exception ValueError(int value) { message: string = "Bad "+value to string; }
            void main(){ try { throw ValueError(7); } catch (BasicException e){ print(e.message); } }
        "#;
        let out = run(src, "").unwrap();
        assert_eq!(out, "Bad 7\n");
    }

    #[test]
    fn division_by_zero_is_fatal() {
        let err = run("void main(){ print(1/0); }", "").unwrap_err();
        match err {
            EvalOutcome::Fatal(InterpreterError::DivisionByZero { .. }) => {}
            other => panic!("expected DivisionByZero, got {:?}", other),
        }
    }

    #[test]
    fn recursion_limit_is_enforced() {
        let err = run("void main(){ main2(); } void main2(){ main2(); }", "").unwrap_err();
        match err {
            EvalOutcome::Fatal(InterpreterError::RecursionTooDeep { .. }) => {}
            other => panic!("expected RecursionTooDeep, got {:?}", other),
        }
    }

    #[test]
    fn short_circuit_or_skips_right_operand() {
        let src = r#"
            bool sentinel() { print("called"); return true; }
            void main() { x = true or sentinel(); }
        "#;
        let out = run(src, "").unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn block_scoping_does_not_leak_declarations() {
        let src = r#"
            void main() {
                x = 1;
                if (true) { y = 2; x = y; }
                print(x);
            }
        "#;
        let out = run(src, "").unwrap();
        assert_eq!(out, "2\n");
    }
}
