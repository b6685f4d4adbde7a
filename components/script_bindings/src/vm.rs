//! The VM façade: one runtime instance plus its registration surface.

use std::any::TypeId;
use std::rc::Rc;

use script_core::{class_name, ClassBinding, NativeFunction, ScriptError, Value};
use script_interpreter::{builtins, Evaluator, ExecutionContext};
use script_parser::Parser;

use crate::builder::ClassBindingBuilder;
use crate::marshal::FromScript;
use crate::trampoline::ScriptFunction;
use crate::ScriptClass;

/// One script runtime instance.
///
/// Owns the global namespace, the class bindings, and the object handle
/// registry; every binding and live handle is scoped to this instance.
/// Dropping the VM finalizes all still-live handles: native destructors
/// of runtime-owned objects run, externally-owned objects are released
/// untouched.
///
/// A VM is single-threaded (`!Send`) and must not be shared across
/// threads without external handoff.
pub struct Vm {
    ctx: ExecutionContext,
}

impl Vm {
    /// Create a VM with the builtin globals installed.
    pub fn new() -> Self {
        let mut ctx = ExecutionContext::new();
        builtins::install(&mut ctx);
        Self { ctx }
    }

    /// Start registering native type `T` as a script-visible class.
    ///
    /// The class becomes visible under [`class_name::<T>()`] as a global
    /// namespace object. Fails with `DuplicateRegistration` if the name
    /// or the type is already registered on this VM.
    pub fn register_class<T: ScriptClass>(
        &mut self,
    ) -> Result<ClassBindingBuilder<T>, ScriptError> {
        let name = class_name::<T>();
        let binding = self
            .ctx
            .classes
            .insert(ClassBinding::new(name, TypeId::of::<T>()))?;
        self.ctx.set_global(name, Value::Class(binding.clone()));
        Ok(ClassBindingBuilder::new(binding))
    }

    /// Register a native function under a global name.
    ///
    /// Re-registering a name overwrites it, like any other global
    /// assignment.
    pub fn register_function<Args, Ret, F>(&mut self, name: &str, function: F)
    where
        F: ScriptFunction<Args, Ret>,
    {
        log::debug!("registering global function '{name}'");
        self.ctx.set_global(
            name,
            Value::Function(Rc::new(NativeFunction {
                name: name.to_string(),
                call: function.into_trampoline(),
            })),
        );
    }

    /// Execute a script to completion and convert its result to `T`.
    ///
    /// Blocks until the script returns or errors. Any uncaught
    /// script-level error fails the call; a result the script did return
    /// but that cannot convert to `T` is a `TypeMismatch`.
    pub fn do_string<T: FromScript>(&mut self, code: &str) -> Result<T, ScriptError> {
        log::trace!("do_string: {code:?}");
        let block = Parser::new(code)?.parse()?;
        let value = Evaluator::new(&mut self.ctx).run(&block)?;
        T::from_script(value)
    }

    /// Read a global by name, e.g. to retain a handle past the script.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.ctx.global(name)
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
