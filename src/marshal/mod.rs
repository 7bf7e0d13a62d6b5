//! Marshaling - typed arguments to and from the runtime's cell convention
//!
//! Architecture:
//! - `format.rs` - format specifier parsing and validation
//! - `args.rs` - typed argument sum replacing C varargs
//! - `invoke.rs` - packed-buffer construction, native call, output write-back

mod args;
mod format;
mod invoke;

pub use args::Arg;
pub use format::{parse, Spec};
pub use invoke::{call_native, invoke_native};

use crate::vm::HeapError;

/// Marshaling failures.
///
/// Everything here is a caller contract violation or a lookup miss; capacity
/// overruns are not errors (they truncate, by design).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// Format string contains a character outside the specifier alphabet
    UnknownSpecifier { specifier: char },
    /// Format length and argument count disagree
    ArityMismatch { expected: usize, got: usize },
    /// Argument variant does not satisfy its specifier
    SpecifierMismatch {
        index: usize,
        specifier: char,
        got: &'static str,
    },
    /// Mutable string slot declared without usable capacity
    MissingCapacity { index: usize },
    /// No native registered under the requested name
    NativeNotFound { name: String },
    /// Scratch storage vanished underneath a write-back
    Heap(HeapError),
}

impl core::fmt::Display for MarshalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownSpecifier { specifier } => {
                write!(f, "unknown format specifier '{}'", specifier)
            }
            Self::ArityMismatch { expected, got } => {
                write!(f, "format expects {} arguments, got {}", expected, got)
            }
            Self::SpecifierMismatch { index, specifier, got } => write!(
                f,
                "argument {} does not match specifier '{}' (got {})",
                index, specifier, got
            ),
            Self::MissingCapacity { index } => {
                write!(f, "mutable string argument {} has no capacity", index)
            }
            Self::NativeNotFound { name } => write!(f, "native '{}' not found", name),
            Self::Heap(err) => write!(f, "heap access failed: {}", err),
        }
    }
}

impl std::error::Error for MarshalError {}

impl From<HeapError> for MarshalError {
    fn from(err: HeapError) -> Self {
        Self::Heap(err)
    }
}

#[cfg(test)]
mod tests;
