//! Error types surfaced at the library boundary (spec §7: `NotFound`,
//! `ParseError`).

use core::fmt;

/// A source location in the token stream being ingested, for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Loc {
    /// 1-based line number.
    pub line: u32,
}

impl Loc {
    /// A location with no further detail than a line number.
    pub fn new(line: u32) -> Self {
        Loc { line }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

/// Errors surfaced by `wln-hier`.
#[derive(Debug)]
pub enum Error {
    /// A named file, module, wire, or cell could not be found.
    NotFound(String),
    /// The token stream did not match the ingest contract.
    ParseError(Loc, String),
    /// A programmer-visible invariant was violated (module uniqueness,
    /// non-topological cell reference that slipped past normalization).
    InvariantViolation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(what) => write!(f, "not found: {what}"),
            Error::ParseError(loc, msg) => write!(f, "parse error at {loc}: {msg}"),
            Error::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// The crate-local result alias.
pub type Result<T> = core::result::Result<T, Error>;
