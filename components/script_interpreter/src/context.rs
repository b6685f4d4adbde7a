//! Execution context: the per-VM state the evaluator runs against.

use std::collections::HashMap;

use script_core::{ClassTable, HandleRegistry, MarshalContext, Value};

/// Mutable state of one VM instance.
///
/// Owns the global namespace, the class bindings, and the handle
/// registry. All bindings and live handles are scoped to this context;
/// dropping it finalizes every still-live handle, so native destructors
/// of runtime-owned objects run even if the embedder retained a handle.
#[derive(Default)]
pub struct ExecutionContext {
    /// Global namespace visible to scripts
    pub globals: HashMap<String, Value>,
    /// Class bindings registered on this VM
    pub classes: ClassTable,
    /// Pointer-keyed index of live object handles
    pub registry: HandleRegistry,
}

impl ExecutionContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a global by name.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(name).cloned()
    }

    /// Set a global by name.
    pub fn set_global(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    /// Borrow the marshalling view used when invoking a trampoline.
    pub fn marshal(&mut self) -> MarshalContext<'_> {
        MarshalContext {
            classes: &self.classes,
            registry: &mut self.registry,
        }
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        self.registry.finalize_all();
    }
}
