//! Value marshalling between native and script representations.
//!
//! [`FromScript`] converts a script value into a requested native type,
//! failing with `TypeMismatch` when the tags are incompatible.
//! [`ToScript`] converts a native value outward; object-typed results
//! delegate to the handle registry through the marshal context so that
//! pointer identity is preserved. [`FromScriptArgs`] unpacks a packed
//! argument list positionally into a tuple of `FromScript` types.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use script_core::{class_name, MarshalContext, ScriptError, Value};

/// Marker trait for native types exposed to scripts as classes.
///
/// The registered class name is derived from the type name via
/// [`class_name`]. Implement it with an empty block:
///
/// ```
/// use script_bindings::ScriptClass;
///
/// struct Person;
/// impl ScriptClass for Person {}
/// ```
pub trait ScriptClass: Any {}

/// Conversion from a script value to a native value.
pub trait FromScript: Sized {
    /// Convert, failing with `TypeMismatch` on an incompatible tag.
    fn from_script(value: Value) -> Result<Self, ScriptError>;
}

/// Conversion from a native value to a script value.
pub trait ToScript {
    /// Convert, using the marshal context for object wrapping.
    fn to_script(self, ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError>;
}

/// Ownership-transfer wrapper for object return values.
///
/// A native callable returns `Owned(value)` to hand the object to the
/// runtime: the resulting handle is runtime-owned and the object is
/// destroyed when the handle is finalized. To share an externally
/// managed object instead, return the `Rc<RefCell<T>>` itself.
pub struct Owned<T>(pub T);

impl FromScript for Value {
    fn from_script(value: Value) -> Result<Self, ScriptError> {
        Ok(value)
    }
}

impl FromScript for () {
    /// The void conversion accepts any value and discards it.
    fn from_script(_value: Value) -> Result<Self, ScriptError> {
        Ok(())
    }
}

impl FromScript for bool {
    fn from_script(value: Value) -> Result<Self, ScriptError> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(ScriptError::type_mismatch("boolean", other.type_name())),
        }
    }
}

impl FromScript for i64 {
    fn from_script(value: Value) -> Result<Self, ScriptError> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(ScriptError::type_mismatch("integer", other.type_name())),
        }
    }
}

impl FromScript for i32 {
    fn from_script(value: Value) -> Result<Self, ScriptError> {
        match value {
            Value::Integer(i) => i32::try_from(i).map_err(|_| {
                ScriptError::type_mismatch("32-bit integer", &format!("integer {i}"))
            }),
            other => Err(ScriptError::type_mismatch("integer", other.type_name())),
        }
    }
}

impl FromScript for f64 {
    fn from_script(value: Value) -> Result<Self, ScriptError> {
        match value {
            Value::Number(n) => Ok(n),
            Value::Integer(i) => Ok(i as f64),
            other => Err(ScriptError::type_mismatch("number", other.type_name())),
        }
    }
}

impl FromScript for String {
    fn from_script(value: Value) -> Result<Self, ScriptError> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            other => Err(ScriptError::type_mismatch("string", other.type_name())),
        }
    }
}

impl<T: ScriptClass> FromScript for Rc<RefCell<T>> {
    /// Extract the shared native object behind a handle of class `T`.
    fn from_script(value: Value) -> Result<Self, ScriptError> {
        let Value::Object(handle) = value else {
            return Err(ScriptError::type_mismatch(
                class_name::<T>(),
                value.type_name(),
            ));
        };
        if handle.binding().borrow().type_id != TypeId::of::<T>() {
            return Err(ScriptError::type_mismatch(
                class_name::<T>(),
                &handle.class_name(),
            ));
        }
        let native = handle.native()?;
        native
            .downcast::<RefCell<T>>()
            .map_err(|_| ScriptError::type_mismatch(class_name::<T>(), "foreign object"))
    }
}

impl ToScript for Value {
    fn to_script(self, _ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        Ok(self)
    }
}

impl ToScript for () {
    fn to_script(self, _ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        Ok(Value::Nil)
    }
}

impl ToScript for bool {
    fn to_script(self, _ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        Ok(Value::Boolean(self))
    }
}

impl ToScript for i64 {
    fn to_script(self, _ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        Ok(Value::Integer(self))
    }
}

impl ToScript for i32 {
    fn to_script(self, _ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        Ok(Value::Integer(self as i64))
    }
}

impl ToScript for f64 {
    fn to_script(self, _ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        Ok(Value::Number(self))
    }
}

impl ToScript for String {
    fn to_script(self, _ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        Ok(Value::string(self))
    }
}

impl ToScript for &'static str {
    fn to_script(self, _ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        Ok(Value::string(self))
    }
}

impl<T: ScriptClass> ToScript for Owned<T> {
    /// Transfer the object to the runtime as a runtime-owned handle.
    fn to_script(self, ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        ctx.wrap_owned(self.0)
    }
}

impl<T: ScriptClass> ToScript for Rc<RefCell<T>> {
    /// Share an externally managed object; repeated returns of the same
    /// object reuse the existing handle.
    fn to_script(self, ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        ctx.wrap_shared(self)
    }
}

impl<R: ToScript> ToScript for Result<R, ScriptError> {
    /// A failing native callable propagates its error as a script-level
    /// error; construct it with [`ScriptError::native`] for
    /// `NativeCallFailure`.
    fn to_script(self, ctx: &mut MarshalContext<'_>) -> Result<Value, ScriptError> {
        self?.to_script(ctx)
    }
}

/// Positional unpacking of a packed argument list into native values.
pub trait FromScriptArgs: Sized {
    /// Number of arguments the implementing tuple expects.
    const ARITY: usize;

    /// Unpack and convert, failing with `ArgumentCountMismatch` on a
    /// length mismatch and argument-annotated `TypeMismatch` on an
    /// incompatible element.
    fn from_script_args(args: Vec<Value>) -> Result<Self, ScriptError>;
}

macro_rules! impl_from_script_args {
    ($count:expr $(, $ty:ident : $idx:expr)*) => {
        impl<$($ty: FromScript),*> FromScriptArgs for ($($ty,)*) {
            const ARITY: usize = $count;

            #[allow(unused_mut, unused_variables)]
            fn from_script_args(args: Vec<Value>) -> Result<Self, ScriptError> {
                if args.len() != $count {
                    return Err(ScriptError::argument_count($count, args.len()));
                }
                let mut iter = args.into_iter();
                Ok(($(
                    {
                        let value = iter
                            .next()
                            .ok_or_else(|| ScriptError::argument_count($count, $idx))?;
                        $ty::from_script(value).map_err(|e| e.at_argument($idx + 1))?
                    },
                )*))
            }
        }
    };
}

impl_from_script_args!(0);
impl_from_script_args!(1, A: 0);
impl_from_script_args!(2, A: 0, B: 1);
impl_from_script_args!(3, A: 0, B: 1, C: 2);
impl_from_script_args!(4, A: 0, B: 1, C: 2, D: 3);
impl_from_script_args!(5, A: 0, B: 1, C: 2, D: 3, E: 4);
