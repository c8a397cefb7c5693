//! Error kinds produced by the word-level network IR.

use core::fmt;

use crate::object::ObjectId;

/// Failure modes for `wln-ir` operations (spec §7, the subset owned by
/// component B).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A combinational cycle was found while walking from CO/DFF roots.
    ///
    /// `path` lists the objects on the cycle in traversal order, ending at
    /// the object whose back-edge closed the loop.
    Cycle {
        /// The object at which the cycle was detected (the back-edge target).
        object: ObjectId,
        /// The traversal path, first node first, ending at `object`.
        path: Vec<ObjectId>,
    },
    /// A programmer error in the core: an operation violated an invariant
    /// that must never happen given correct callers (spec: always fatal).
    InvariantViolation(String),
    /// Allocation failed.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Cycle { object, path } => {
                write!(f, "combinational cycle detected at {object}, path: ")?;
                for (i, p) in path.iter().enumerate() {
                    if i > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "{p}")?;
                }
                Ok(())
            }
            Error::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
            Error::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for Error {}

/// Convenience alias used throughout `wln-ir`.
pub type Result<T> = core::result::Result<T, Error>;
