//! Recursive-descent parser producing a [`Block`].

use script_core::ScriptError;

use crate::ast::{BinaryOp, Block, Expr, Stmt, UnaryOp};
use crate::lexer::{tokenize, Keyword, Token, TokenKind};

/// Parser over a source string.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser for a source string. Lexing errors surface from
    /// [`Parser::parse`].
    pub fn new(source: &str) -> Result<Self, ScriptError> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    /// Parse the whole chunk.
    pub fn parse(mut self) -> Result<Block, ScriptError> {
        let block = self.block()?;
        self.expect_eof()?;
        Ok(block)
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn bump(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), ScriptError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}, found {:?}", self.peek())))
        }
    }

    fn expect_eof(&mut self) -> Result<(), ScriptError> {
        match self.peek() {
            TokenKind::Eof => Ok(()),
            other => Err(self.error(format!("unexpected {other:?} after chunk"))),
        }
    }

    fn error(&self, message: impl std::fmt::Display) -> ScriptError {
        ScriptError::syntax(self.line(), message)
    }

    fn at_block_end(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Eof
                | TokenKind::Keyword(Keyword::End)
                | TokenKind::Keyword(Keyword::Else)
                | TokenKind::Keyword(Keyword::Elseif)
        )
    }

    fn block(&mut self) -> Result<Block, ScriptError> {
        let mut stmts = Vec::new();
        while !self.at_block_end() {
            stmts.push(self.statement()?);
            while self.eat(&TokenKind::Semicolon) {}
        }
        Ok(Block { stmts })
    }

    fn statement(&mut self) -> Result<Stmt, ScriptError> {
        match self.peek().clone() {
            TokenKind::Keyword(Keyword::Local) => {
                self.bump();
                let name = self.ident("local variable name")?;
                self.expect(&TokenKind::Assign, "'='")?;
                let value = self.expression()?;
                Ok(Stmt::Local { name, value })
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.bump();
                let value = if self.at_block_end() || self.peek() == &TokenKind::Semicolon {
                    None
                } else {
                    Some(self.expression()?)
                };
                Ok(Stmt::Return(value))
            }
            TokenKind::Keyword(Keyword::If) => {
                self.bump();
                self.if_statement()
            }
            TokenKind::Keyword(Keyword::While) => {
                self.bump();
                let cond = self.expression()?;
                self.expect(&TokenKind::Keyword(Keyword::Do), "'do'")?;
                let body = self.block()?;
                self.expect(&TokenKind::Keyword(Keyword::End), "'end'")?;
                Ok(Stmt::While { cond, body })
            }
            TokenKind::Keyword(
                kw @ (Keyword::For
                | Keyword::In
                | Keyword::Function
                | Keyword::Repeat
                | Keyword::Until
                | Keyword::Break),
            ) => Err(self.error(format!("unsupported construct '{kw:?}'"))),
            _ => self.expression_statement(),
        }
    }

    /// Body of an `if`, positioned after the `if`/`elseif` keyword.
    fn if_statement(&mut self) -> Result<Stmt, ScriptError> {
        let cond = self.expression()?;
        self.expect(&TokenKind::Keyword(Keyword::Then), "'then'")?;
        let then_block = self.block()?;
        let else_block = if self.eat(&TokenKind::Keyword(Keyword::Elseif)) {
            let nested = self.if_statement()?;
            Some(Block {
                stmts: vec![nested],
            })
        } else if self.eat(&TokenKind::Keyword(Keyword::Else)) {
            let block = self.block()?;
            self.expect(&TokenKind::Keyword(Keyword::End), "'end'")?;
            Some(block)
        } else {
            self.expect(&TokenKind::Keyword(Keyword::End), "'end'")?;
            None
        };
        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
        })
    }

    /// Either `name = expr` or a call evaluated for its effects.
    fn expression_statement(&mut self) -> Result<Stmt, ScriptError> {
        let expr = self.expression()?;
        if self.eat(&TokenKind::Assign) {
            let Expr::Name(name) = expr else {
                return Err(self.error("only a name can be assigned to"));
            };
            let value = self.expression()?;
            return Ok(Stmt::Assign { name, value });
        }
        match expr {
            Expr::Call { .. } | Expr::MethodCall { .. } => Ok(Stmt::Expr(expr)),
            _ => Err(self.error("expected a statement")),
        }
    }

    fn ident(&mut self, what: &str) -> Result<String, ScriptError> {
        match self.bump() {
            TokenKind::Ident(name) => Ok(name),
            other => Err(self.error(format!("expected {what}, found {other:?}"))),
        }
    }

    fn expression(&mut self) -> Result<Expr, ScriptError> {
        self.binary_expr(0)
    }

    /// Operator precedence. Returns `(op, left, right)` binding powers;
    /// concat is right-associative so its right power is below its left.
    fn binary_op(kind: &TokenKind) -> Option<(BinaryOp, u8, u8)> {
        Some(match kind {
            TokenKind::Keyword(Keyword::Or) => (BinaryOp::Or, 1, 2),
            TokenKind::Keyword(Keyword::And) => (BinaryOp::And, 3, 4),
            TokenKind::Eq => (BinaryOp::Eq, 5, 6),
            TokenKind::NotEq => (BinaryOp::NotEq, 5, 6),
            TokenKind::Lt => (BinaryOp::Lt, 5, 6),
            TokenKind::LtEq => (BinaryOp::LtEq, 5, 6),
            TokenKind::Gt => (BinaryOp::Gt, 5, 6),
            TokenKind::GtEq => (BinaryOp::GtEq, 5, 6),
            TokenKind::Concat => (BinaryOp::Concat, 9, 8),
            TokenKind::Plus => (BinaryOp::Add, 10, 11),
            TokenKind::Minus => (BinaryOp::Sub, 10, 11),
            TokenKind::Star => (BinaryOp::Mul, 12, 13),
            TokenKind::Slash => (BinaryOp::Div, 12, 13),
            TokenKind::Percent => (BinaryOp::Mod, 12, 13),
            _ => return None,
        })
    }

    fn binary_expr(&mut self, min_power: u8) -> Result<Expr, ScriptError> {
        let mut lhs = self.unary_expr()?;
        while let Some((op, left, right)) = Self::binary_op(self.peek()) {
            if left < min_power {
                break;
            }
            self.bump();
            let rhs = self.binary_expr(right)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Expr, ScriptError> {
        let op = match self.peek() {
            TokenKind::Keyword(Keyword::Not) => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let expr = self.unary_expr()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.postfix_expr()
    }

    fn postfix_expr(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.primary_expr()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    self.bump();
                    let args = self.call_args()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::Colon => {
                    self.bump();
                    let method = self.ident("method name")?;
                    self.expect(&TokenKind::LParen, "'('")?;
                    let args = self.call_args()?;
                    expr = Expr::MethodCall {
                        receiver: Box::new(expr),
                        method,
                        args,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Argument list, positioned after the opening parenthesis.
    fn call_args(&mut self) -> Result<Vec<Expr>, ScriptError> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RParen, "')'")?;
            return Ok(args);
        }
    }

    fn primary_expr(&mut self) -> Result<Expr, ScriptError> {
        match self.bump() {
            TokenKind::Keyword(Keyword::Nil) => Ok(Expr::Nil),
            TokenKind::Keyword(Keyword::True) => Ok(Expr::True),
            TokenKind::Keyword(Keyword::False) => Ok(Expr::False),
            TokenKind::Int(i) => Ok(Expr::Int(i)),
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Str(s) => Ok(Expr::Str(s)),
            TokenKind::Ident(name) => Ok(Expr::Name(name)),
            TokenKind::LParen => {
                let expr = self.expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            other => Err(self.error(format!("unexpected {other:?}"))),
        }
    }
}
