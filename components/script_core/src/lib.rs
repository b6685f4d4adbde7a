//! Core types of the script binding layer.
//!
//! This crate provides the data model shared by the runtime and the typed
//! binding API:
//!
//! - [`Value`] - tagged union carried across every trampoline boundary
//! - [`ScriptError`] / [`ErrorKind`] - structured runtime and binding errors
//! - [`ClassBinding`] / [`ClassTable`] - per-VM class registration state
//! - [`ObjectHandle`] / [`HandleRegistry`] - identity-preserving wrappers
//!   around native objects, with explicit ownership tracking
//! - [`class_name`] - VM-independent registered-name lookup for a type
//!
//! # Examples
//!
//! ```
//! use script_core::{class_name, Value};
//!
//! struct Person;
//!
//! assert_eq!(class_name::<Person>(), "Person");
//! assert!(Value::Integer(42).is_truthy());
//! assert_eq!(Value::Nil.type_name(), "nil");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod class;
mod error;
mod handle;
mod value;

pub use class::{class_name, ClassBinding, ClassTable, Trampoline};
pub use error::{ErrorKind, ScriptError};
pub use handle::{HandleRegistry, MarshalContext, ObjectHandle, Ownership};
pub use value::{NativeFunction, Value};
