//! Error kinds owned by the bit-blasting engine (spec §7).

use core::fmt;

/// Failure modes surfaced while lowering a module to gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A cell's `type` did not resolve to a known operator or module
    /// (spec §4.D "Operator with unsupported type fails with
    /// `UnsupportedOperator(type_name)`").
    UnsupportedOperator(String),
    /// A recognized but unimplemented feature (spec §4.D: "Asynchronous-
    /// reset flop triggers `UnsupportedFeature("asynchronous reset")`"),
    /// also used for the CLI's explicitly out-of-scope commands.
    UnsupportedFeature(String),
    /// An operator's declared output width didn't match what its
    /// expander produced.
    WidthMismatch { expected: u32, actual: u32 },
    /// A named wire or signal could not be resolved within its module.
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedOperator(name) => write!(f, "unsupported operator: {name}"),
            Error::UnsupportedFeature(what) => write!(f, "unsupported feature: {what}"),
            Error::WidthMismatch { expected, actual } => {
                write!(f, "width mismatch: expected {expected}, got {actual}")
            }
            Error::NotFound(what) => write!(f, "not found: {what}"),
        }
    }
}

impl std::error::Error for Error {}

/// The crate-local result alias.
pub type Result<T> = core::result::Result<T, Error>;
