//! Script error types shared by the runtime and the binding layer.
//!
//! Every fallible operation in the workspace reports a [`ScriptError`]
//! carrying an [`ErrorKind`] so callers can distinguish marshalling
//! failures from lifetime and registration failures.

use std::fmt;

use thiserror::Error;

/// Classification of runtime and binding errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed script source
    Syntax,
    /// A value's tag does not match the requested native type
    TypeMismatch,
    /// A call supplied fewer or more arguments than the signature requires
    ArgumentCountMismatch,
    /// A method call's implicit receiver is missing, of the wrong class,
    /// or not an object handle at all
    InvalidReceiver,
    /// Use of an object handle after its native object was finalized
    StaleHandle,
    /// A class or member name was registered twice on one VM
    DuplicateRegistration,
    /// A script referenced a class or constructor never registered
    /// on this VM
    UnregisteredClass,
    /// The native callable itself failed during a trampoline invocation
    NativeCallFailure,
    /// Any other script-level failure (calling a nil value, arithmetic
    /// on a string, division by zero)
    Runtime,
}

impl ErrorKind {
    /// Short human-readable name for the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::ArgumentCountMismatch => "argument count mismatch",
            ErrorKind::InvalidReceiver => "invalid receiver",
            ErrorKind::StaleHandle => "stale handle",
            ErrorKind::DuplicateRegistration => "duplicate registration",
            ErrorKind::UnregisteredClass => "unregistered class",
            ErrorKind::NativeCallFailure => "native call failure",
            ErrorKind::Runtime => "runtime error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised by the script runtime or the binding layer.
///
/// Errors detected inside a trampoline surface as script-level errors in
/// the calling script; if uncaught they propagate out of `do_string`.
/// Registration errors are returned synchronously to the native caller.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ScriptError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl ScriptError {
    /// Create an error of an arbitrary kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Syntax error at a source line.
    pub fn syntax(line: u32, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Syntax, format!("line {line}: {message}"))
    }

    /// Value tag incompatible with the requested type.
    pub fn type_mismatch(expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("expected {expected}, got {got}"),
        )
    }

    /// Wrong number of call arguments.
    pub fn argument_count(expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArgumentCountMismatch,
            format!("expected {expected} argument(s), got {got}"),
        )
    }

    /// Bad implicit receiver in a method call.
    pub fn invalid_receiver(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidReceiver, message)
    }

    /// Handle used after finalization.
    pub fn stale_handle(class: &str) -> Self {
        Self::new(
            ErrorKind::StaleHandle,
            format!("handle of class '{class}' was already finalized"),
        )
    }

    /// Name collision at registration time.
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateRegistration, message)
    }

    /// Reference to a class or constructor that was never registered.
    pub fn unregistered(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnregisteredClass, message)
    }

    /// Failure raised by the native callable itself.
    pub fn native(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NativeCallFailure, message)
    }

    /// Generic script-level failure.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Annotate an error with the 1-based position of the argument that
    /// caused it, keeping the kind.
    pub fn at_argument(self, index: usize) -> Self {
        Self {
            kind: self.kind,
            message: format!("argument #{index}: {}", self.message),
        }
    }
}
