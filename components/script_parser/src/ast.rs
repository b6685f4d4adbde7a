//! Abstract syntax tree for the script language.

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation
    Neg,
    /// Logical negation
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/` (always float division)
    Div,
    /// `%`
    Mod,
    /// `..`
    Concat,
    /// `==`
    Eq,
    /// `~=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `and` (short-circuit)
    And,
    /// `or` (short-circuit)
    Or,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `nil`
    Nil,
    /// `true`
    True,
    /// `false`
    False,
    /// Integer literal
    Int(i64),
    /// Float literal
    Number(f64),
    /// String literal
    Str(String),
    /// Variable reference
    Name(String),
    /// Unary operation
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        expr: Box<Expr>,
    },
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
    /// Call of a global function value: `f(args...)`
    Call {
        /// Callee expression
        callee: Box<Expr>,
        /// Positional arguments
        args: Vec<Expr>,
    },
    /// Method-style call: `recv:name(args...)`.
    ///
    /// On an instance this dispatches an instance method with the
    /// receiver passed implicitly; on a class object it dispatches the
    /// constructor (`new`) or a static function.
    MethodCall {
        /// Receiver expression
        receiver: Box<Expr>,
        /// Member name
        method: String,
        /// Positional arguments
        args: Vec<Expr>,
    },
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Global (or enclosing-local) assignment: `name = expr`
    Assign {
        /// Target name
        name: String,
        /// Assigned value
        value: Expr,
    },
    /// Chunk-local declaration: `local name = expr`
    Local {
        /// Declared name
        name: String,
        /// Initial value
        value: Expr,
    },
    /// Expression evaluated for its effects (a call)
    Expr(Expr),
    /// `return [expr]`
    Return(Option<Expr>),
    /// `if cond then ... [else ...] end` (elseif desugars to a nested if)
    If {
        /// Condition
        cond: Expr,
        /// Then branch
        then_block: Block,
        /// Else branch, if present
        else_block: Option<Block>,
    },
    /// `while cond do ... end`
    While {
        /// Loop condition
        cond: Expr,
        /// Loop body
        body: Block,
    },
}

/// A sequence of statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    /// The statements in source order
    pub stmts: Vec<Stmt>,
}
