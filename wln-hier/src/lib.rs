//! Hierarchical RTL library: multi-module container above the word-level
//! network (component C).
//!
//! See `SPEC_FULL.md` §4.C at the workspace root for the contract this
//! crate implements.

pub mod cell;
pub mod error;
pub mod ids;
pub mod lex;
pub mod library;
pub mod module;
pub mod normalize;
pub mod operator;
pub mod parse;
pub mod pool;
pub mod signal;
pub mod token;
pub mod wire;

pub use cell::{Cell, CellMark, CellTarget};
pub use error::{Error, Loc, Result};
pub use ids::{CellId, ConcatId, ConstId, ModuleId, SliceId, WireId};
pub use library::{InvariantRecord, Lib};
pub use module::{Module, ModuleItem};
pub use parse::ingest;
pub use pool::{ConcatPool, ConstPool, ConstValue, SlicePool};
pub use signal::{Signal, SliceDescriptor};
pub use token::Token;
pub use wire::{Wire, WireIo};
