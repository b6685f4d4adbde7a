//! Dispatch trampolines: generic adapters from runtime calls to native
//! calls.
//!
//! One trampoline is produced per registered member at registration time,
//! closing over the native callable and its static signature, so argument
//! conversion is specialized once rather than re-derived per call. At
//! call time a trampoline unpacks the packed argument list (popping and
//! unwrapping the receiver handle for methods), converts the arguments,
//! invokes the native callable, and converts the result back.

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

use script_core::{class_name, MarshalContext, ScriptError, Trampoline, Value};

use crate::marshal::{FromScript, FromScriptArgs, ScriptClass, ToScript};

/// A native callable registrable as a free or static function.
pub trait ScriptFunction<Args, Ret>: 'static {
    /// Produce the dispatch trampoline for this callable.
    fn into_trampoline(self) -> Trampoline;
}

/// A native callable registrable as an instance method with a shared
/// receiver (`&T`).
pub trait ScriptMethod<This, Args, Ret>: 'static {
    /// Produce the dispatch trampoline for this callable.
    fn into_trampoline(self) -> Trampoline;
}

/// A native callable registrable as an instance method with a mutable
/// receiver (`&mut T`).
pub trait ScriptMethodMut<This, Args, Ret>: 'static {
    /// Produce the dispatch trampoline for this callable.
    fn into_trampoline(self) -> Trampoline;
}

/// A native callable registrable as a class constructor.
///
/// The constructed object is wrapped as a runtime-owned handle.
pub trait ScriptConstructor<This, Args>: 'static {
    /// Produce the dispatch trampoline for this callable.
    fn into_trampoline(self) -> Trampoline;
}

/// Pop and unwrap the receiver handle from a packed method call.
///
/// Fails with `InvalidReceiver` when the receiver is missing, not an
/// object handle, or of the wrong class, and with `StaleHandle` when the
/// handle was already finalized.
fn split_receiver<T: ScriptClass>(
    args: Vec<Value>,
) -> Result<(Rc<RefCell<T>>, Vec<Value>), ScriptError> {
    let mut iter = args.into_iter();
    let receiver = iter
        .next()
        .ok_or_else(|| ScriptError::invalid_receiver("method call without a receiver"))?;
    let handle = match receiver {
        Value::Object(handle) => handle,
        other => {
            return Err(ScriptError::invalid_receiver(format!(
                "expected an instance of '{}', got {}",
                class_name::<T>(),
                other.type_name()
            )));
        }
    };
    if handle.binding().borrow().type_id != TypeId::of::<T>() {
        return Err(ScriptError::invalid_receiver(format!(
            "expected an instance of '{}', got an instance of '{}'",
            class_name::<T>(),
            handle.class_name()
        )));
    }
    let native = handle.native()?;
    let cell = native
        .downcast::<RefCell<T>>()
        .map_err(|_| ScriptError::invalid_receiver("receiver stores a foreign object"))?;
    Ok((cell, iter.collect()))
}

macro_rules! impl_script_callables {
    ($($ty:ident),*) => {
        impl<Fun, Ret, $($ty,)*> ScriptFunction<($($ty,)*), Ret> for Fun
        where
            Fun: Fn($($ty),*) -> Ret + 'static,
            Ret: ToScript + 'static,
            $($ty: FromScript + 'static,)*
        {
            fn into_trampoline(self) -> Trampoline {
                Rc::new(move |ctx: &mut MarshalContext<'_>, args: Vec<Value>| {
                    #[allow(non_snake_case)]
                    let ($($ty,)*) = <($($ty,)*)>::from_script_args(args)?;
                    self($($ty),*).to_script(ctx)
                })
            }
        }

        impl<Fun, This, Ret, $($ty,)*> ScriptMethod<This, ($($ty,)*), Ret> for Fun
        where
            Fun: Fn(&This, $($ty),*) -> Ret + 'static,
            This: ScriptClass,
            Ret: ToScript + 'static,
            $($ty: FromScript + 'static,)*
        {
            fn into_trampoline(self) -> Trampoline {
                Rc::new(move |ctx: &mut MarshalContext<'_>, args: Vec<Value>| {
                    let (cell, rest) = split_receiver::<This>(args)?;
                    #[allow(non_snake_case)]
                    let ($($ty,)*) = <($($ty,)*)>::from_script_args(rest)?;
                    let this = cell.try_borrow().map_err(|_| {
                        ScriptError::native("receiver is already mutably borrowed")
                    })?;
                    self(&*this, $($ty),*).to_script(ctx)
                })
            }
        }

        impl<Fun, This, Ret, $($ty,)*> ScriptMethodMut<This, ($($ty,)*), Ret> for Fun
        where
            Fun: Fn(&mut This, $($ty),*) -> Ret + 'static,
            This: ScriptClass,
            Ret: ToScript + 'static,
            $($ty: FromScript + 'static,)*
        {
            fn into_trampoline(self) -> Trampoline {
                Rc::new(move |ctx: &mut MarshalContext<'_>, args: Vec<Value>| {
                    let (cell, rest) = split_receiver::<This>(args)?;
                    #[allow(non_snake_case)]
                    let ($($ty,)*) = <($($ty,)*)>::from_script_args(rest)?;
                    let mut this = cell.try_borrow_mut().map_err(|_| {
                        ScriptError::native("receiver is already borrowed")
                    })?;
                    self(&mut *this, $($ty),*).to_script(ctx)
                })
            }
        }

        impl<Fun, This, $($ty,)*> ScriptConstructor<This, ($($ty,)*)> for Fun
        where
            Fun: Fn($($ty),*) -> This + 'static,
            This: ScriptClass,
            $($ty: FromScript + 'static,)*
        {
            fn into_trampoline(self) -> Trampoline {
                Rc::new(move |ctx: &mut MarshalContext<'_>, args: Vec<Value>| {
                    #[allow(non_snake_case)]
                    let ($($ty,)*) = <($($ty,)*)>::from_script_args(args)?;
                    ctx.wrap_owned(self($($ty),*))
                })
            }
        }
    };
}

impl_script_callables!();
impl_script_callables!(A);
impl_script_callables!(A, B);
impl_script_callables!(A, B, C);
impl_script_callables!(A, B, C, D);
impl_script_callables!(A, B, C, D, E);
