//! Class bindings: the registered, name-indexed description of a native
//! class's constructor, methods, and static functions.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ScriptError;
use crate::handle::MarshalContext;
use crate::value::Value;

/// A generic call adapter produced once per registered member.
///
/// At call time it receives the packed argument list from the runtime call
/// (for methods, the receiver handle is the first element) and a marshal
/// context for converting object values, and returns the packed result.
pub type Trampoline =
    Rc<dyn Fn(&mut MarshalContext<'_>, Vec<Value>) -> Result<Value, ScriptError>>;

/// The binding of one native type on one VM instance.
///
/// Holds the trampolines installed through the class builder. A class may
/// be registered without a constructor when only native code constructs
/// instances.
pub struct ClassBinding {
    /// Script-visible class name
    pub name: String,
    /// `TypeId` of the native type behind this binding
    pub type_id: TypeId,
    /// Constructor trampoline invoked by `ClassName:new(...)`
    pub constructor: Option<Trampoline>,
    /// Instance method table
    pub methods: HashMap<String, Trampoline>,
    /// Static function table
    pub statics: HashMap<String, Trampoline>,
}

impl ClassBinding {
    /// Create an empty binding for a native type.
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
            constructor: None,
            methods: HashMap::new(),
            statics: HashMap::new(),
        }
    }

    /// Whether a member name is already taken by a method or a static.
    pub fn has_member(&self, name: &str) -> bool {
        self.methods.contains_key(name) || self.statics.contains_key(name)
    }
}

impl std::fmt::Debug for ClassBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassBinding")
            .field("name", &self.name)
            .field("constructor", &self.constructor.is_some())
            .field("methods", &self.methods.len())
            .field("statics", &self.statics.len())
            .finish()
    }
}

/// Per-VM registry of class bindings, indexed by name and by `TypeId`.
///
/// Each class's table is a distinct namespace object; registering two
/// classes never lets one class's members leak into the other's table.
#[derive(Default)]
pub struct ClassTable {
    by_name: HashMap<String, Rc<RefCell<ClassBinding>>>,
    by_type: HashMap<TypeId, Rc<RefCell<ClassBinding>>>,
}

impl ClassTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new class binding.
    ///
    /// Fails with `DuplicateRegistration` if the name or the native type
    /// is already registered on this VM.
    pub fn insert(
        &mut self,
        binding: ClassBinding,
    ) -> Result<Rc<RefCell<ClassBinding>>, ScriptError> {
        if self.by_name.contains_key(&binding.name) {
            return Err(ScriptError::duplicate(format!(
                "class '{}' is already registered",
                binding.name
            )));
        }
        if self.by_type.contains_key(&binding.type_id) {
            return Err(ScriptError::duplicate(format!(
                "native type of class '{}' is already registered under another name",
                binding.name
            )));
        }
        log::debug!("registering class '{}'", binding.name);
        let name = binding.name.clone();
        let type_id = binding.type_id;
        let shared = Rc::new(RefCell::new(binding));
        self.by_name.insert(name, shared.clone());
        self.by_type.insert(type_id, shared.clone());
        Ok(shared)
    }

    /// Look up a binding by its script-visible name.
    pub fn by_name(&self, name: &str) -> Option<Rc<RefCell<ClassBinding>>> {
        self.by_name.get(name).cloned()
    }

    /// Look up a binding by the `TypeId` of its native type.
    pub fn by_type_id(&self, type_id: TypeId) -> Option<Rc<RefCell<ClassBinding>>> {
        self.by_type.get(&type_id).cloned()
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether no class has been registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// The name under which a native type is (or would be) registered,
/// independent of any VM instance.
///
/// Derived from the type's path: the last path segment, with any generic
/// parameter list stripped.
pub fn class_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
