//! Type-safe bindings between native Rust types and the script runtime.
//!
//! This crate is the embedder-facing surface of the binding layer. A
//! [`Vm`] owns one runtime instance; native classes are registered
//! through [`Vm::register_class`] and the chainable
//! [`ClassBindingBuilder`], free functions through
//! [`Vm::register_function`], and scripts run through [`Vm::do_string`]
//! with the result converted to any [`FromScript`] type.
//!
//! ```
//! use script_bindings::{ScriptClass, Vm};
//!
//! struct Person {
//!     name: String,
//! }
//! impl ScriptClass for Person {}
//!
//! impl Person {
//!     fn new(name: String) -> Self {
//!         Self { name }
//!     }
//!
//!     fn name(&self) -> String {
//!         self.name.clone()
//!     }
//! }
//!
//! let mut vm = Vm::new();
//! vm.register_class::<Person>()
//!     .unwrap()
//!     .constructor(Person::new)
//!     .unwrap()
//!     .method("name", Person::name)
//!     .unwrap();
//!
//! let name: String = vm
//!     .do_string("p = Person:new('loh')\nreturn p:name()")
//!     .unwrap();
//! assert_eq!(name, "loh");
//! ```
//!
//! Argument and result conversion is driven by the [`FromScript`] and
//! [`ToScript`] traits; registered callables are adapted to the runtime
//! calling convention once, at registration time, by the trampoline
//! traits in [`trampoline`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod marshal;
pub mod trampoline;
pub mod vm;

pub use builder::ClassBindingBuilder;
pub use marshal::{FromScript, FromScriptArgs, Owned, ScriptClass, ToScript};
pub use trampoline::{ScriptConstructor, ScriptFunction, ScriptMethod, ScriptMethodMut};
pub use vm::Vm;

pub use script_core::{class_name, ErrorKind, Ownership, ScriptError, Value};
