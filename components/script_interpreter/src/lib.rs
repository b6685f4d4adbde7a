//! Tree-walking interpreter for the embedded script language.
//!
//! This crate executes parsed chunks against a per-VM
//! [`ExecutionContext`] that owns the global namespace, the class
//! bindings, and the object handle registry. Native calls are dispatched
//! through the trampolines registered by the binding layer.
//!
//! # Example
//!
//! ```
//! use script_interpreter::{builtins, Evaluator, ExecutionContext};
//! use script_parser::Parser;
//! use script_core::Value;
//!
//! let mut ctx = ExecutionContext::new();
//! builtins::install(&mut ctx);
//!
//! let block = Parser::new("return 1 + 2").unwrap().parse().unwrap();
//! let result = Evaluator::new(&mut ctx).run(&block).unwrap();
//! assert_eq!(result, Value::Integer(3));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builtins;
pub mod context;
pub mod eval;

pub use context::ExecutionContext;
pub use eval::Evaluator;
