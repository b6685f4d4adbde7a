//! Script value representation.
//!
//! `Value` is the tagged union carried across every trampoline boundary,
//! for both arguments and return values. Primitives are stored inline;
//! native objects are referenced through deduplicated [`ObjectHandle`]s
//! so that script-level equality observes pointer identity.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::class::{ClassBinding, Trampoline};
use crate::handle::ObjectHandle;

/// A native function registered into the script's global namespace.
pub struct NativeFunction {
    /// Name the function was registered under
    pub name: String,
    /// The dispatch trampoline
    pub call: Trampoline,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Any script-visible value.
#[derive(Clone)]
pub enum Value {
    /// The absent value
    Nil,
    /// true or false
    Boolean(bool),
    /// 64-bit integer
    Integer(i64),
    /// Double-precision float
    Number(f64),
    /// Immutable string
    Str(Rc<str>),
    /// Handle to a native object
    Object(Rc<ObjectHandle>),
    /// A registered class's namespace object
    Class(Rc<RefCell<ClassBinding>>),
    /// A registered native function
    Function(Rc<NativeFunction>),
}

impl Value {
    /// Build a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    /// Name reported by the script-level `type` builtin.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Object(_) => "userdata",
            Value::Class(_) => "class",
            Value::Function(_) => "function",
        }
    }

    /// Script truthiness: only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Script-level `==`.
///
/// Object handles compare by identity: two handles are equal iff they
/// wrap the same native object, which the handle registry guarantees to
/// mean they are the same handle. Integers and floats compare across
/// representations.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Integer(a), Value::Number(b)) | (Value::Number(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Value::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Object(h) => f.debug_tuple("Object").field(h).finish(),
            Value::Class(c) => f.debug_tuple("Class").field(&c.borrow().name).finish(),
            Value::Function(func) => f.debug_tuple("Function").field(&func.name).finish(),
        }
    }
}

/// Conversion used by `tostring`, `print`, and the `..` operator.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    // Integer-valued floats display without a decimal point
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Str(s) => write!(f, "{s}"),
            Value::Object(h) => write!(f, "{}: 0x{:x}", h.class_name(), h.key()),
            Value::Class(c) => write!(f, "class {}", c.borrow().name),
            Value::Function(func) => write!(f, "function: {}", func.name),
        }
    }
}
