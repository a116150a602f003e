mod error;

pub use error::ParserError;

use crate::ast::{
    AttributeDecl, BinaryOp, Block, CatchClause, ElifBranch, ExceptionDef, Expression, Function,
    Parameter, Program, Statement, Type, UnaryOp,
};
use crate::lexer::{Lexer, Token, TokenKind, TokenValue};

/// Consumes a flat token stream and produces a [`Program`].
///
/// Holds a fully materialized token vector (comments already filtered out)
/// and a cursor into it, giving single-token lookahead via `current()`.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, crate::lexer::LexError> {
        let tokens = Lexer::new(source)
            .tokenize()?
            .into_iter()
            .filter(|t| t.kind != TokenKind::Comment)
            .collect();
        Ok(Self { tokens, pos: 0 })
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, expected_desc: &str) -> Result<Token, ParserError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParserError::UnexpectedToken {
                position: self.current().position,
                got: self.current().kind,
                expected: expected_desc.to_string(),
            })
        }
    }

    fn ident_text(tok: &Token) -> String {
        tok.as_str_value()
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    /// Top-level entry point: parse the whole token stream into a [`Program`].
    pub fn get_program(&mut self) -> Result<Program, ParserError> {
        let mut program = Program::new();

        while !self.check(TokenKind::Etx) {
            if self.check(TokenKind::Exception) {
                let exc = self.parse_exception_decl()?;
                if program.exceptions.contains_key(&exc.name) {
                    return Err(ParserError::DuplicateDeclaration {
                        position: exc.position,
                        name: exc.name,
                    });
                }
                program.exceptions.insert(exc.name.clone(), exc);
            } else if self.starts_return_type() {
                let func = self.parse_function_decl()?;
                if program.functions.contains_key(&func.name) {
                    return Err(ParserError::DuplicateDeclaration {
                        position: func.position,
                        name: func.name,
                    });
                }
                program.functions.insert(func.name.clone(), func);
            } else {
                return Err(ParserError::ExpectedDeclaration {
                    position: self.current().position,
                });
            }
        }

        Ok(program)
    }

    fn starts_return_type(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Int | TokenKind::Float | TokenKind::Bool | TokenKind::String | TokenKind::Void
        )
    }

    fn parse_simple_type(&mut self) -> Result<Type, ParserError> {
        let tok = self.current().clone();
        let t = match tok.kind {
            TokenKind::Int => Type::Int,
            TokenKind::Float => Type::Float,
            TokenKind::Bool => Type::Bool,
            TokenKind::String => Type::String,
            _ => {
                return Err(ParserError::ExpectedSimpleType {
                    position: tok.position,
                    after: format!("{:?}", tok.kind),
                })
            }
        };
        self.advance();
        Ok(t)
    }

    fn parse_return_type(&mut self) -> Result<Type, ParserError> {
        if self.check(TokenKind::Void) {
            self.advance();
            return Ok(Type::Void);
        }
        self.parse_simple_type()
    }

    /// Whether the current token can begin an expression, used to distinguish
    /// "no condition/expression present at all" from a deeper parse failure.
    fn starts_expression(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::BoolLiteral
                | TokenKind::StringLiteral
                | TokenKind::LParen
                | TokenKind::Identifier
                | TokenKind::Bang
                | TokenKind::Not
                | TokenKind::Minus
        )
    }

    /// Parses `"(" expression ")"` in a condition position (`if`/`elif`/`while`),
    /// raising a dedicated error naming the owning keyword when no expression
    /// follows the opening paren.
    fn parse_condition(&mut self, keyword: &str) -> Result<Expression, ParserError> {
        self.expect(TokenKind::LParen, "'('")?;
        if !self.starts_expression() {
            return Err(ParserError::ExpectedCondition {
                position: self.current().position,
                keyword: keyword.to_string(),
            });
        }
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(condition)
    }

    fn parse_function_decl(&mut self) -> Result<Function, ParserError> {
        let position = self.current().position;
        let return_type = self.parse_return_type()?;
        let name_tok = self.expect(TokenKind::Identifier, "a function name")?;
        let name = Self::ident_text(&name_tok);
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_parameters()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = self.parse_block("function declaration")?;
        Ok(Function {
            position,
            name,
            params,
            return_type,
            body,
        })
    }

    fn parse_exception_decl(&mut self) -> Result<ExceptionDef, ParserError> {
        let position = self.current().position;
        self.expect(TokenKind::Exception, "'exception'")?;
        let name_tok = self.expect(TokenKind::Identifier, "an exception name")?;
        let name = Self::ident_text(&name_tok);
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_parameters()?;
        self.expect(TokenKind::RParen, "')'")?;
        let attributes = self.parse_attributes(&name)?;
        Ok(ExceptionDef {
            position,
            name,
            params,
            attributes,
        })
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>, ParserError> {
        let mut params = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(params);
        }
        params.push(self.parse_parameter()?);
        while self.check(TokenKind::Comma) {
            self.advance();
            params.push(self.parse_parameter()?);
        }
        Ok(params)
    }

    fn parse_parameter(&mut self) -> Result<Parameter, ParserError> {
        let position = self.current().position;
        if !matches!(
            self.current().kind,
            TokenKind::Int | TokenKind::Float | TokenKind::Bool | TokenKind::String
        ) {
            return Err(ParserError::ExpectedParameter { position });
        }
        let type_ = self.parse_simple_type()?;
        let name_tok = self.expect(TokenKind::Identifier, "a parameter name")?;
        Ok(Parameter::new(position, Self::ident_text(&name_tok), type_))
    }

    fn parse_attributes(&mut self, owner: &str) -> Result<Vec<AttributeDecl>, ParserError> {
        if !self.check(TokenKind::LBrace) {
            return Err(ParserError::ExpectedAttributes {
                position: self.current().position,
                in_decl: owner.to_string(),
            });
        }
        self.advance();
        let mut attrs = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let position = self.current().position;
            let name_tok = self.expect(TokenKind::Identifier, "an attribute name")?;
            let name = Self::ident_text(&name_tok);
            self.expect(TokenKind::Colon, "':'")?;
            let type_ = self.parse_simple_type()?;
            self.expect(TokenKind::Assign, "'='")?;
            let initializer = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, "';'")?;
            attrs.push(AttributeDecl {
                position,
                name,
                type_,
                initializer,
            });
        }
        self.advance(); // '}'
        Ok(attrs)
    }

    fn parse_block(&mut self, where_: &str) -> Result<Block, ParserError> {
        let position = self.current().position;
        if !self.check(TokenKind::LBrace) {
            return Err(ParserError::ExpectedStatementBlock {
                position,
                where_: where_.to_string(),
            });
        }
        self.advance();
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) {
            statements.push(self.parse_statement()?);
        }
        self.advance(); // '}'
        Ok(Block {
            position,
            statements,
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        match self.current().kind {
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block("block statement")?)),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Break => {
                let position = self.advance().position;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Statement::Break { position })
            }
            TokenKind::Continue => {
                let position = self.advance().position;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Statement::Continue { position })
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Identifier => self.parse_assign_or_call(),
            _ => Err(ParserError::ExpectedDeclaration {
                position: self.current().position,
            }),
        }
    }

    fn parse_if(&mut self) -> Result<Statement, ParserError> {
        let position = self.advance().position; // 'if'
        let condition = self.parse_condition("if")?;
        let then_block = self.parse_block("if statement")?;

        let mut elifs = Vec::new();
        while self.check(TokenKind::Elif) {
            let elif_position = self.advance().position;
            let cond = self.parse_condition("elif")?;
            let block = self.parse_block("elif statement")?;
            elifs.push(ElifBranch {
                position: elif_position,
                condition: cond,
                block,
            });
        }

        let else_block = if self.check(TokenKind::Else) {
            self.advance();
            Some(self.parse_block("else statement")?)
        } else {
            None
        };

        Ok(Statement::If {
            position,
            condition,
            then_block,
            elifs,
            else_block,
        })
    }

    fn parse_while(&mut self) -> Result<Statement, ParserError> {
        let position = self.advance().position;
        let condition = self.parse_condition("while")?;
        let body = self.parse_block("while statement")?;
        Ok(Statement::While {
            position,
            condition,
            body,
        })
    }

    fn parse_return(&mut self) -> Result<Statement, ParserError> {
        let position = self.advance().position;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Statement::Return { position, value })
    }

    fn parse_try(&mut self) -> Result<Statement, ParserError> {
        let position = self.advance().position;
        let try_block = self.parse_block("try statement")?;
        let mut catches = Vec::new();
        while self.check(TokenKind::Catch) {
            let catch_pos = self.advance().position;
            self.expect(TokenKind::LParen, "'('")?;
            let exc_tok = self.expect(TokenKind::Identifier, "an exception type")?;
            let binding_tok = self.expect(TokenKind::Identifier, "a binding name")?;
            self.expect(TokenKind::RParen, "')'")?;
            let body = self.parse_block("catch statement")?;
            catches.push(CatchClause {
                position: catch_pos,
                exception_name: Self::ident_text(&exc_tok),
                binding: Self::ident_text(&binding_tok),
                body,
            });
        }
        Ok(Statement::TryCatch {
            position,
            try_block,
            catches,
        })
    }

    fn parse_throw(&mut self) -> Result<Statement, ParserError> {
        let position = self.advance().position;
        let name_tok = self.expect(TokenKind::Identifier, "an exception name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let args = self.parse_args()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Statement::Throw {
            position,
            name: Self::ident_text(&name_tok),
            args,
        })
    }

    fn parse_assign_or_call(&mut self) -> Result<Statement, ParserError> {
        let position = self.current().position;
        let name_tok = self.advance();
        let name = Self::ident_text(&name_tok);

        if self.check(TokenKind::Assign) {
            self.advance();
            let value = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, "';'")?;
            Ok(Statement::Assignment {
                position,
                name,
                value,
            })
        } else if self.check(TokenKind::LParen) {
            self.advance();
            let args = self.parse_args()?;
            self.expect(TokenKind::RParen, "')'")?;
            self.expect(TokenKind::Semicolon, "';'")?;
            Ok(Statement::Call {
                position,
                name,
                args,
            })
        } else {
            Err(ParserError::UnexpectedToken {
                position: self.current().position,
                got: self.current().kind,
                expected: "'=' or '('".to_string(),
            })
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expression>, ParserError> {
        let mut args = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(args);
        }
        args.push(self.parse_expression()?);
        while self.check(TokenKind::Comma) {
            self.advance();
            args.push(self.parse_expression()?);
        }
        Ok(args)
    }

    // --- Expression grammar, precedence low to high ---

    fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        let mut left = self.parse_and_expr()?;
        while self.check(TokenKind::Or) {
            let position = self.advance().position;
            let right = self.parse_and_expr()?;
            left = Expression::Or {
                position,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expression, ParserError> {
        let mut left = self.parse_rel_expr()?;
        while self.check(TokenKind::And) {
            let position = self.advance().position;
            let right = self.parse_rel_expr()?;
            left = Expression::And {
                position,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn rel_op(kind: TokenKind) -> Option<BinaryOp> {
        match kind {
            TokenKind::Eq => Some(BinaryOp::Eq),
            TokenKind::Ne => Some(BinaryOp::Ne),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::Le => Some(BinaryOp::Le),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::Ge => Some(BinaryOp::Ge),
            _ => None,
        }
    }

    fn parse_rel_expr(&mut self) -> Result<Expression, ParserError> {
        let left = self.parse_add_expr()?;
        if let Some(op) = Self::rel_op(self.current().kind) {
            let position = self.advance().position;
            let right = self.parse_add_expr()?;
            // Non-chainable: a second relational operator here is an error.
            if Self::rel_op(self.current().kind).is_some() {
                return Err(ParserError::UnexpectedToken {
                    position: self.current().position,
                    got: self.current().kind,
                    expected: "a non-relational continuation (relational operators do not chain)"
                        .to_string(),
                });
            }
            return Ok(Expression::Binary {
                position,
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_add_expr(&mut self) -> Result<Expression, ParserError> {
        let mut left = self.parse_mul_expr()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Plus,
                TokenKind::Minus => BinaryOp::Minus,
                _ => break,
            };
            let position = self.advance().position;
            let right = self.parse_mul_expr()?;
            left = Expression::Binary {
                position,
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_mul_expr(&mut self) -> Result<Expression, ParserError> {
        let mut left = self.parse_cast_expr()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let position = self.advance().position;
            let right = self.parse_cast_expr()?;
            left = Expression::Binary {
                position,
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_cast_expr(&mut self) -> Result<Expression, ParserError> {
        let expr = self.parse_unary()?;
        if self.check(TokenKind::To) {
            let position = self.advance().position;
            let target = self.parse_cast_target()?;
            return Ok(Expression::Cast {
                position,
                expr: Box::new(expr),
                target,
            });
        }
        Ok(expr)
    }

    /// Looks up the cast target type named after `to`. Unlike
    /// [`Self::parse_simple_type`] (used for parameter/attribute/return-type
    /// positions), an unrecognized token here is an `UnknownType`, not an
    /// `ExpectedSimpleType` — the grammar position is a type name, not a
    /// declaration needing *some* type.
    fn parse_cast_target(&mut self) -> Result<Type, ParserError> {
        let tok = self.current().clone();
        let t = match tok.kind {
            TokenKind::Int => Type::Int,
            TokenKind::Float => Type::Float,
            TokenKind::Bool => Type::Bool,
            TokenKind::String => Type::String,
            _ => {
                return Err(ParserError::UnknownType {
                    position: tok.position,
                    got: format!("{:?}", tok.kind),
                })
            }
        };
        self.advance();
        Ok(t)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParserError> {
        let op = match self.current().kind {
            TokenKind::Bang | TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            let position = self.advance().position;
            let operand = self.parse_unary()?;
            return Ok(Expression::Unary {
                position,
                op,
                operand: Box::new(operand),
            });
        }
        self.parse_basic()
    }

    fn parse_basic(&mut self) -> Result<Expression, ParserError> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = match tok.value {
                    Some(TokenValue::Int(v)) => v,
                    _ => unreachable!("IntLiteral token without int value"),
                };
                Ok(Expression::IntLit {
                    position: tok.position,
                    value,
                })
            }
            TokenKind::FloatLiteral => {
                self.advance();
                let value = match tok.value {
                    Some(TokenValue::Float(v)) => v,
                    _ => unreachable!("FloatLiteral token without float value"),
                };
                Ok(Expression::FloatLit {
                    position: tok.position,
                    value,
                })
            }
            TokenKind::BoolLiteral => {
                self.advance();
                let value = match tok.value {
                    Some(TokenValue::Bool(v)) => v,
                    _ => unreachable!("BoolLiteral token without bool value"),
                };
                Ok(Expression::BoolLit {
                    position: tok.position,
                    value,
                })
            }
            TokenKind::StringLiteral => {
                self.advance();
                let value = match tok.value {
                    Some(TokenValue::Str(v)) => v,
                    _ => unreachable!("StringLiteral token without string value"),
                };
                Ok(Expression::StringLit {
                    position: tok.position,
                    value,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::Identifier => self.parse_call_attr_or_var(),
            _ => Err(ParserError::ExpectedExpression {
                position: tok.position,
                after_operator: format!("{:?}", tok.kind),
            }),
        }
    }

    fn parse_call_attr_or_var(&mut self) -> Result<Expression, ParserError> {
        let position = self.current().position;
        let name_tok = self.advance();
        let name = Self::ident_text(&name_tok);

        if self.check(TokenKind::LParen) {
            self.advance();
            let args = self.parse_args()?;
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(Expression::Call {
                position,
                name,
                args,
            });
        }

        if self.check(TokenKind::Dot) {
            self.advance();
            let attr_tok = self.expect(TokenKind::Identifier, "an attribute name")?;
            return Ok(Expression::AttrAccess {
                position,
                var_name: name,
                attr_name: Self::ident_text(&attr_tok),
            });
        }

        Ok(Expression::Variable { position, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(src: &str) -> Program {
        Parser::new(src).unwrap().get_program().unwrap()
    }

    #[test]
    fn parses_empty_main() {
        let p = program("void main() {}");
        assert!(p.functions.contains_key("main"));
    }

    #[test]
    fn rejects_duplicate_function() {
        let err = Parser::new("void main() {} void main() {}")
            .unwrap()
            .get_program()
            .unwrap_err();
        assert!(matches!(err, ParserError::DuplicateDeclaration { .. }));
    }

    #[test]
    fn respects_precedence() {
        let p = program("void main() { x = 1 + 2 * 3; }");
        let body = &p.functions["main"].body;
        match &body.statements[0] {
            Statement::Assignment { value, .. } => match value {
                Expression::Binary {
                    op: BinaryOp::Plus,
                    right,
                    ..
                } => {
                    assert!(matches!(
                        **right,
                        Expression::Binary {
                            op: BinaryOp::Mul,
                            ..
                        }
                    ));
                }
                other => panic!("expected top-level Plus, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn or_binds_looser_than_and() {
        let p = program("void main() { x = a or b and c; }");
        match &p.functions["main"].body.statements[0] {
            Statement::Assignment { value, .. } => {
                assert!(matches!(value, Expression::Or { .. }));
            }
            _ => panic!("expected assignment"),
        }
    }

    #[test]
    fn rejects_chained_relational() {
        let err = Parser::new("void main() { x = a < b < c; }")
            .unwrap()
            .get_program()
            .unwrap_err();
        assert!(matches!(err, ParserError::UnexpectedToken { .. }));
    }

    #[test]
    fn parses_exception_with_attributes() {
        let p = program(
            "exception ValueError(int value) { message: string = \"bad\"; } void main() {}",
        );
        let exc = &p.exceptions["ValueError"];
        assert_eq!(exc.attributes.len(), 1);
        assert_eq!(exc.attributes[0].name, "message");
    }

    #[test]
    fn parses_try_catch() {
        let p = program(
            "void main() { try { throw ValueError(1); } catch (BasicException e) { print(e.message); } }",
        );
        match &p.functions["main"].body.statements[0] {
            Statement::TryCatch { catches, .. } => assert_eq!(catches.len(), 1),
            other => panic!("expected try/catch, got {:?}", other),
        }
    }

    #[test]
    fn missing_if_condition_is_expected_condition() {
        let err = Parser::new("void main() { if () {} }")
            .unwrap()
            .get_program()
            .unwrap_err();
        assert!(matches!(err, ParserError::ExpectedCondition { .. }));
    }

    #[test]
    fn missing_while_condition_is_expected_condition() {
        let err = Parser::new("void main() { while () {} }")
            .unwrap()
            .get_program()
            .unwrap_err();
        assert!(matches!(err, ParserError::ExpectedCondition { .. }));
    }

    #[test]
    fn missing_if_block_is_expected_statement_block() {
        let err = Parser::new("void main() { if (true) print(1); }")
            .unwrap()
            .get_program()
            .unwrap_err();
        assert!(matches!(err, ParserError::ExpectedStatementBlock { .. }));
    }

    #[test]
    fn missing_function_body_is_expected_statement_block() {
        let err = Parser::new("void main()").unwrap().get_program().unwrap_err();
        assert!(matches!(err, ParserError::ExpectedStatementBlock { .. }));
    }

    #[test]
    fn unknown_cast_target_is_unknown_type() {
        let err = Parser::new("void main() { x = 1 to foo; }")
            .unwrap()
            .get_program()
            .unwrap_err();
        assert!(matches!(err, ParserError::UnknownType { .. }));
    }
}
