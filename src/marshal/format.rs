//! Format specifier parsing
//!
//! A format string describes the wire shape of each argument, one
//! case-sensitive character per argument. Parsing is fully validated before
//! any staging happens, so a malformed format never leaves partial state
//! behind.

use super::MarshalError;

/// Wire shape of a single argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spec {
    /// `i` / `d` - integer by value
    Int,
    /// `b` - boolean by value
    Bool,
    /// `f` - float by value (bit pattern)
    Float,
    /// `r` - const scalar reference, passed by address
    ConstRef,
    /// `R` - mutable scalar reference, copied back after the call
    MutRef,
    /// `s` - const string, staged null-terminated
    ConstString,
    /// `S` - mutable string buffer with a declared capacity
    MutString,
}

impl Spec {
    /// The specifier character this shape is written as
    pub const fn symbol(self) -> char {
        match self {
            Self::Int => 'i',
            Self::Bool => 'b',
            Self::Float => 'f',
            Self::ConstRef => 'r',
            Self::MutRef => 'R',
            Self::ConstString => 's',
            Self::MutString => 'S',
        }
    }
}

/// Parse a format string into one `Spec` per argument.
///
/// An unrecognized character is a caller contract violation and fails the
/// whole parse.
pub fn parse(format: &str) -> Result<Vec<Spec>, MarshalError> {
    let mut specs = Vec::with_capacity(format.len());
    for ch in format.chars() {
        let spec = match ch {
            'i' | 'd' => Spec::Int,
            'b' => Spec::Bool,
            'f' => Spec::Float,
            'r' => Spec::ConstRef,
            'R' => Spec::MutRef,
            's' => Spec::ConstString,
            'S' => Spec::MutString,
            other => return Err(MarshalError::UnknownSpecifier { specifier: other }),
        };
        specs.push(spec);
    }
    Ok(specs)
}
