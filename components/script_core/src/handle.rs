//! Object handles and the per-VM handle registry.
//!
//! A handle is the runtime-visible wrapper around one native object. The
//! registry is a pointer-keyed, non-owning index that deduplicates wrap
//! requests so repeated returns of the same native object yield the same
//! handle, which keeps script-level equality and method dispatch
//! consistent. The registry never extends a native object's lifetime on
//! its own; ownership stays with whichever side created the object.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::class::{ClassBinding, ClassTable};
use crate::error::ScriptError;
use crate::value::Value;

/// Who is responsible for destroying the wrapped native object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The runtime owns the object; finalizing the handle destroys it.
    Runtime,
    /// The object is externally managed; finalizing the handle releases
    /// only the handle's reference and leaves the object untouched.
    External,
}

/// Runtime-visible wrapper around one native object.
///
/// The native object is stored as `Rc<RefCell<T>>` behind `dyn Any`. For a
/// runtime-owned handle that `Rc` is the sole owner, so finalization runs
/// the native destructor exactly once. For an externally-owned handle the
/// provider holds a co-owning `Rc` and finalization only drops the
/// handle's share.
pub struct ObjectHandle {
    key: usize,
    binding: Rc<RefCell<ClassBinding>>,
    ownership: Ownership,
    cell: RefCell<Option<Rc<dyn Any>>>,
}

impl ObjectHandle {
    fn new(
        key: usize,
        binding: Rc<RefCell<ClassBinding>>,
        ownership: Ownership,
        cell: Rc<dyn Any>,
    ) -> Self {
        Self {
            key,
            binding,
            ownership,
            cell: RefCell::new(Some(cell)),
        }
    }

    /// Address of the wrapped native object, used as identity key.
    pub fn key(&self) -> usize {
        self.key
    }

    /// The class binding this handle dispatches through.
    pub fn binding(&self) -> &Rc<RefCell<ClassBinding>> {
        &self.binding
    }

    /// Ownership flag assigned when the handle was first wrapped.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Registered name of the handle's class.
    pub fn class_name(&self) -> String {
        self.binding.borrow().name.clone()
    }

    /// Whether the handle has already been finalized.
    pub fn is_stale(&self) -> bool {
        self.cell.borrow().is_none()
    }

    /// Unwrap the native object.
    ///
    /// Fails with `StaleHandle` if the handle was finalized.
    pub fn native(&self) -> Result<Rc<dyn Any>, ScriptError> {
        self.cell
            .borrow()
            .clone()
            .ok_or_else(|| ScriptError::stale_handle(&self.class_name()))
    }

    /// Release the handle's reference to the native object.
    ///
    /// For a runtime-owned handle this destroys the object (the handle
    /// holds the sole `Rc`). Finalizing twice is a no-op; the destructor
    /// can never run more than once through this path.
    pub fn finalize(&self) {
        if let Some(cell) = self.cell.borrow_mut().take() {
            log::trace!(
                "finalizing {} handle of class '{}' at 0x{:x}",
                match self.ownership {
                    Ownership::Runtime => "runtime-owned",
                    Ownership::External => "externally-owned",
                },
                self.class_name(),
                self.key
            );
            drop(cell);
        }
    }
}

impl std::fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("class", &self.class_name())
            .field("key", &format_args!("0x{:x}", self.key))
            .field("ownership", &self.ownership)
            .field("stale", &self.is_stale())
            .finish()
    }
}

/// Pointer-keyed index of the live handles of one VM instance.
///
/// Entries are weak: the registry only remembers that a handle already
/// exists so it can be reused, and treats dead entries as absent. Dead
/// entries are pruned lazily on `wrap`.
#[derive(Default)]
pub struct HandleRegistry {
    entries: HashMap<usize, Weak<ObjectHandle>>,
}

impl HandleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a native object, reusing the existing handle if the object is
    /// already wrapped for this VM.
    ///
    /// The ownership flag of an existing live handle is never overwritten.
    pub fn wrap(
        &mut self,
        key: usize,
        binding: Rc<RefCell<ClassBinding>>,
        ownership: Ownership,
        cell: Rc<dyn Any>,
    ) -> Rc<ObjectHandle> {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        if let Some(existing) = self.entries.get(&key).and_then(Weak::upgrade) {
            if !existing.is_stale() {
                log::trace!("reusing handle for 0x{key:x}");
                return existing;
            }
        }
        let handle = Rc::new(ObjectHandle::new(key, binding, ownership, cell));
        log::trace!(
            "wrapping 0x{key:x} as {:?} handle of class '{}'",
            ownership,
            handle.class_name()
        );
        self.entries.insert(key, Rc::downgrade(&handle));
        handle
    }

    /// Look up the live handle for a native object, if any.
    pub fn lookup(&self, key: usize) -> Option<Rc<ObjectHandle>> {
        self.entries.get(&key).and_then(Weak::upgrade)
    }

    /// Number of live handles currently indexed.
    pub fn live_count(&self) -> usize {
        self.entries
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Finalize every live handle and clear the index.
    ///
    /// Invoked when the owning VM is destroyed: runtime-owned native
    /// objects are destructed here, externally-owned objects are merely
    /// released. Handles retained by the embedder become stale.
    pub fn finalize_all(&mut self) {
        for (_, weak) in self.entries.drain() {
            if let Some(handle) = weak.upgrade() {
                handle.finalize();
            }
        }
    }
}

/// Borrowed view of the state a trampoline needs to marshal object values:
/// the class table for binding lookups and the handle registry for
/// identity-preserving wrapping.
pub struct MarshalContext<'a> {
    /// Class bindings registered on the VM
    pub classes: &'a ClassTable,
    /// The VM's handle registry
    pub registry: &'a mut HandleRegistry,
}

impl<'a> MarshalContext<'a> {
    /// Wrap a freshly constructed native object as a runtime-owned handle.
    ///
    /// Fails with `UnregisteredClass` if `T` has no binding on this VM.
    pub fn wrap_owned<T: Any>(&mut self, value: T) -> Result<Value, ScriptError> {
        let binding = self.binding_of::<T>()?;
        let cell = Rc::new(RefCell::new(value));
        let key = Rc::as_ptr(&cell) as usize;
        let handle = self
            .registry
            .wrap(key, binding, Ownership::Runtime, cell as Rc<dyn Any>);
        Ok(Value::Object(handle))
    }

    /// Wrap an externally managed native object as a handle that shares
    /// ownership with the provider.
    ///
    /// Repeated wraps of the same object return the same handle.
    pub fn wrap_shared<T: Any>(&mut self, cell: Rc<RefCell<T>>) -> Result<Value, ScriptError> {
        let binding = self.binding_of::<T>()?;
        let key = Rc::as_ptr(&cell) as usize;
        let handle = self
            .registry
            .wrap(key, binding, Ownership::External, cell as Rc<dyn Any>);
        Ok(Value::Object(handle))
    }

    fn binding_of<T: Any>(&self) -> Result<Rc<RefCell<ClassBinding>>, ScriptError> {
        self.classes
            .by_type_id(std::any::TypeId::of::<T>())
            .ok_or_else(|| {
                ScriptError::unregistered(format!(
                    "class '{}' is not registered on this VM",
                    crate::class::class_name::<T>()
                ))
            })
    }
}
