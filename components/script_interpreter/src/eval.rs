//! Tree-walking evaluator.
//!
//! Executes a parsed [`Block`] against an [`ExecutionContext`]. Calls into
//! native code go through the trampolines stored in class bindings and
//! native function values; errors they raise surface as script-level
//! errors from [`Evaluator::run`].

use std::collections::HashMap;

use script_core::{ScriptError, Value};
use script_parser::{BinaryOp, Block, Expr, Stmt, UnaryOp};

use crate::context::ExecutionContext;

/// Result of executing a statement.
enum Flow {
    Normal,
    Return(Value),
}

/// Evaluator for one script chunk.
pub struct Evaluator<'a> {
    ctx: &'a mut ExecutionContext,
    scopes: Vec<HashMap<String, Value>>,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over a context.
    pub fn new(ctx: &'a mut ExecutionContext) -> Self {
        Self {
            ctx,
            scopes: Vec::new(),
        }
    }

    /// Execute a chunk to completion and return its `return` value, or
    /// nil if the chunk falls off the end.
    pub fn run(&mut self, block: &Block) -> Result<Value, ScriptError> {
        self.scopes.push(HashMap::new());
        let flow = self.exec_block(block);
        self.scopes.pop();
        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }

    fn exec_block(&mut self, block: &Block) -> Result<Flow, ScriptError> {
        for stmt in &block.stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, ScriptError> {
        match stmt {
            Stmt::Assign { name, value } => {
                let value = self.eval(value)?;
                self.assign(name, value);
                Ok(Flow::Normal)
            }
            Stmt::Local { name, value } => {
                let value = self.eval(value)?;
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert(name.clone(), value);
                }
                Ok(Flow::Normal)
            }
            Stmt::Expr(expr) => {
                self.eval(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.exec_scoped(then_block)
                } else if let Some(else_block) = else_block {
                    self.exec_scoped(else_block)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { cond, body } => {
                while self.eval(cond)?.is_truthy() {
                    if let Flow::Return(value) = self.exec_scoped(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
        }
    }

    fn exec_scoped(&mut self, block: &Block) -> Result<Flow, ScriptError> {
        self.scopes.push(HashMap::new());
        let flow = self.exec_block(block);
        self.scopes.pop();
        flow
    }

    /// Assign to the innermost local of that name, or fall through to the
    /// global namespace.
    fn assign(&mut self, name: &str, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return;
            }
        }
        self.ctx.set_global(name, value);
    }

    fn lookup(&self, name: &str) -> Value {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return value.clone();
            }
        }
        // Unknown globals read as nil
        self.ctx.global(name).unwrap_or(Value::Nil)
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        match expr {
            Expr::Nil => Ok(Value::Nil),
            Expr::True => Ok(Value::Boolean(true)),
            Expr::False => Ok(Value::Boolean(false)),
            Expr::Int(i) => Ok(Value::Integer(*i)),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::string(s)),
            Expr::Name(name) => Ok(self.lookup(name)),
            Expr::Unary { op, expr } => {
                let value = self.eval(expr)?;
                self.unary(*op, value)
            }
            Expr::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            Expr::Call { callee, args } => {
                let callee = self.eval(callee)?;
                let args = self.eval_args(args)?;
                self.call_value(callee, args)
            }
            Expr::MethodCall {
                receiver,
                method,
                args,
            } => {
                let receiver = self.eval(receiver)?;
                let args = self.eval_args(args)?;
                self.call_method(receiver, method, args)
            }
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, ScriptError> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }

    fn unary(&mut self, op: UnaryOp, value: Value) -> Result<Value, ScriptError> {
        match op {
            UnaryOp::Not => Ok(Value::Boolean(!value.is_truthy())),
            UnaryOp::Neg => match value {
                Value::Integer(i) => Ok(Value::Integer(i.wrapping_neg())),
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(ScriptError::type_mismatch("number", other.type_name())),
            },
        }
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, ScriptError> {
        // Short-circuit operators yield the deciding operand, Lua-style.
        if let BinaryOp::And = op {
            let lhs = self.eval(lhs)?;
            return if lhs.is_truthy() { self.eval(rhs) } else { Ok(lhs) };
        }
        if let BinaryOp::Or = op {
            let lhs = self.eval(lhs)?;
            return if lhs.is_truthy() { Ok(lhs) } else { self.eval(rhs) };
        }

        let lhs = self.eval(lhs)?;
        let rhs = self.eval(rhs)?;
        match op {
            BinaryOp::Eq => Ok(Value::Boolean(lhs == rhs)),
            BinaryOp::NotEq => Ok(Value::Boolean(lhs != rhs)),
            BinaryOp::Concat => {
                let check = |value: &Value| match value {
                    Value::Nil | Value::Boolean(_) => Err(ScriptError::type_mismatch(
                        "string or number",
                        value.type_name(),
                    )),
                    _ => Ok(()),
                };
                check(&lhs)?;
                check(&rhs)?;
                Ok(Value::string(format!("{lhs}{rhs}")))
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                self.compare(op, lhs, rhs)
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                self.arith(op, lhs, rhs)
            }
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn compare(&self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, ScriptError> {
        let ordering = match (&lhs, &rhs) {
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            _ => match (lhs.as_number(), rhs.as_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => {
                    return Err(ScriptError::type_mismatch(
                        "two numbers or two strings",
                        &format!("{} and {}", lhs.type_name(), rhs.type_name()),
                    ));
                }
            },
        };
        let result = match ordering {
            Some(ordering) => match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::LtEq => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                BinaryOp::GtEq => ordering.is_ge(),
                _ => unreachable!("not a comparison operator"),
            },
            // NaN compares false under every ordering operator
            None => false,
        };
        Ok(Value::Boolean(result))
    }

    fn arith(&self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, ScriptError> {
        if let (Value::Integer(a), Value::Integer(b)) = (&lhs, &rhs) {
            let (a, b) = (*a, *b);
            return match op {
                BinaryOp::Add => Ok(Value::Integer(a.wrapping_add(b))),
                BinaryOp::Sub => Ok(Value::Integer(a.wrapping_sub(b))),
                BinaryOp::Mul => Ok(Value::Integer(a.wrapping_mul(b))),
                // Division always produces a float
                BinaryOp::Div => Ok(Value::Number(a as f64 / b as f64)),
                BinaryOp::Mod => {
                    if b == 0 {
                        Err(ScriptError::runtime("attempt to perform 'n % 0'"))
                    } else {
                        Ok(Value::Integer(a.wrapping_rem(b)))
                    }
                }
                _ => unreachable!("not an arithmetic operator"),
            };
        }
        match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => Ok(Value::Number(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Mod => a % b,
                _ => unreachable!("not an arithmetic operator"),
            })),
            _ => {
                let offender = if lhs.as_number().is_none() { &lhs } else { &rhs };
                Err(ScriptError::type_mismatch("number", offender.type_name()))
            }
        }
    }

    /// Invoke a callable value: `f(args...)`.
    fn call_value(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, ScriptError> {
        match callee {
            Value::Function(func) => {
                let trampoline = func.call.clone();
                trampoline(&mut self.ctx.marshal(), args).map_err(|err| {
                    log::debug!("native function '{}' failed: {err}", func.name);
                    err
                })
            }
            Value::Class(class) => Err(ScriptError::runtime(format!(
                "class '{}' is not callable; use '{0}:new(...)'",
                class.borrow().name
            ))),
            other => Err(ScriptError::runtime(format!(
                "attempt to call a {} value",
                other.type_name()
            ))),
        }
    }

    /// Invoke `recv:name(args...)`.
    ///
    /// On a class object this dispatches the constructor (`new`) or a
    /// static function; on an instance it dispatches an instance method
    /// with the receiver handle prepended to the packed arguments.
    fn call_method(
        &mut self,
        receiver: Value,
        method: &str,
        mut args: Vec<Value>,
    ) -> Result<Value, ScriptError> {
        match receiver {
            Value::Class(class) => {
                let trampoline = {
                    let binding = class.borrow();
                    if method == "new" {
                        binding.constructor.clone().ok_or_else(|| {
                            ScriptError::unregistered(format!(
                                "no constructor registered for class '{}'",
                                binding.name
                            ))
                        })?
                    } else {
                        binding.statics.get(method).cloned().ok_or_else(|| {
                            ScriptError::runtime(format!(
                                "no static function '{method}' on class '{}'",
                                binding.name
                            ))
                        })?
                    }
                };
                trampoline(&mut self.ctx.marshal(), args)
            }
            Value::Object(handle) => {
                let trampoline = {
                    let binding = handle.binding().borrow();
                    binding.methods.get(method).cloned().ok_or_else(|| {
                        ScriptError::type_mismatch(
                            &format!("an instance with method '{method}'"),
                            &format!("class '{}'", binding.name),
                        )
                    })?
                };
                let mut packed = Vec::with_capacity(args.len() + 1);
                packed.push(Value::Object(handle));
                packed.append(&mut args);
                trampoline(&mut self.ctx.marshal(), packed)
            }
            other => Err(ScriptError::runtime(format!(
                "attempt to index a {} value",
                other.type_name()
            ))),
        }
    }
}
