//! Error kinds owned by the FRAIG engine (spec §7).

use core::fmt;

/// Failure/soft-failure modes surfaced by `wln-fraig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A SAT call exhausted its backtrack or time budget before reaching
    /// a verdict (spec §7 `Undecided`). Carries a short human-readable
    /// reason; involved nodes are marked `FailedTFO` by the caller before
    /// this is returned.
    Undecided(String),
    /// A programmer error in the core (e.g. a literal referencing an
    /// out-of-range node).
    InvariantViolation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Undecided(reason) => write!(f, "undecided: {reason}"),
            Error::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// The crate-local result alias.
pub type Result<T> = core::result::Result<T, Error>;
