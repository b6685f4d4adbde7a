//! Lexer and parser for the embedded script language.
//!
//! The language is a small Lua-flavoured subset: global and local
//! assignment, `if`/`while` control flow, `return`, calls, method calls
//! (`recv:name(args)`), and the usual operators including string
//! concatenation `..` and inequality `~=`.
//!
//! # Example
//!
//! ```
//! use script_parser::{Parser, Stmt};
//!
//! let block = Parser::new("p = Person:new('loh', 'bolotniy')")
//!     .unwrap()
//!     .parse()
//!     .unwrap();
//! assert!(matches!(block.stmts[0], Stmt::Assign { .. }));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Block, Expr, Stmt, UnaryOp};
pub use lexer::{tokenize, Keyword, Token, TokenKind};
pub use parser::Parser;
