//! Integration test suite for the script binding layer.
//!
//! This crate verifies that components work together correctly across
//! component boundaries: registration through `script_bindings`,
//! execution through `script_parser` and `script_interpreter`, and
//! handle lifetimes through `script_core`.

/// Re-export components for test convenience
pub mod components {
    pub use script_bindings;
    pub use script_core;
    pub use script_interpreter;
    pub use script_parser;
}
