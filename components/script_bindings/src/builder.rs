//! Incremental builder for a class binding.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use script_core::{ClassBinding, ScriptError};

use crate::trampoline::{ScriptConstructor, ScriptFunction, ScriptMethod, ScriptMethodMut};
use crate::ScriptClass;

/// Chainable builder returned by `Vm::register_class`.
///
/// Each operation installs one trampoline into the class's tables and
/// returns the builder, so registrations read as a chain:
///
/// ```ignore
/// vm.register_class::<Person>()?
///     .constructor(Person::new)?
///     .method("simpleCall", Person::simple_call)?;
/// ```
///
/// Name collisions are reported as `DuplicateRegistration` at
/// registration time, never deferred to script execution.
pub struct ClassBindingBuilder<T: ScriptClass> {
    binding: Rc<RefCell<ClassBinding>>,
    _class: PhantomData<T>,
}

impl<T: ScriptClass> ClassBindingBuilder<T> {
    pub(crate) fn new(binding: Rc<RefCell<ClassBinding>>) -> Self {
        Self {
            binding,
            _class: PhantomData,
        }
    }

    /// Register the constructor invoked by `ClassName:new(...)`.
    ///
    /// The constructed object is owned by the runtime: its destructor
    /// runs when the handle is finalized.
    pub fn constructor<Args, F>(self, ctor: F) -> Result<Self, ScriptError>
    where
        F: ScriptConstructor<T, Args>,
    {
        {
            let mut binding = self.binding.borrow_mut();
            if binding.constructor.is_some() {
                return Err(ScriptError::duplicate(format!(
                    "constructor of class '{}' is already registered",
                    binding.name
                )));
            }
            binding.constructor = Some(ctor.into_trampoline());
        }
        Ok(self)
    }

    /// Register an instance method with a shared (`&T`) receiver.
    pub fn method<Args, Ret, F>(self, name: &str, method: F) -> Result<Self, ScriptError>
    where
        F: ScriptMethod<T, Args, Ret>,
    {
        self.install_method(name, method.into_trampoline())
    }

    /// Register an instance method with a mutable (`&mut T`) receiver.
    pub fn method_mut<Args, Ret, F>(self, name: &str, method: F) -> Result<Self, ScriptError>
    where
        F: ScriptMethodMut<T, Args, Ret>,
    {
        self.install_method(name, method.into_trampoline())
    }

    /// Register a static function, callable as `ClassName:name(...)`
    /// without any instance.
    ///
    /// The name `new` is reserved for constructor dispatch and is
    /// rejected here rather than shadowed at call time.
    pub fn static_function<Args, Ret, F>(self, name: &str, function: F) -> Result<Self, ScriptError>
    where
        F: ScriptFunction<Args, Ret>,
    {
        {
            let mut binding = self.binding.borrow_mut();
            if name == "new" {
                return Err(ScriptError::duplicate(format!(
                    "static 'new' of class '{}' collides with constructor dispatch",
                    binding.name
                )));
            }
            if binding.has_member(name) {
                return Err(Self::member_collision(&binding.name, name));
            }
            log::debug!("registering static '{}:{name}'", binding.name);
            binding
                .statics
                .insert(name.to_string(), function.into_trampoline());
        }
        Ok(self)
    }

    fn install_method(
        self,
        name: &str,
        trampoline: script_core::Trampoline,
    ) -> Result<Self, ScriptError> {
        {
            let mut binding = self.binding.borrow_mut();
            if binding.has_member(name) {
                return Err(Self::member_collision(&binding.name, name));
            }
            log::debug!("registering method '{}:{name}'", binding.name);
            binding.methods.insert(name.to_string(), trampoline);
        }
        Ok(self)
    }

    fn member_collision(class: &str, member: &str) -> ScriptError {
        ScriptError::duplicate(format!(
            "member '{member}' of class '{class}' is already registered"
        ))
    }
}

impl<T: ScriptClass> std::fmt::Debug for ClassBindingBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassBindingBuilder")
            .field("binding", &self.binding.borrow())
            .finish()
    }
}
