//! Word-level network IR: range/name interning (component A) and the typed
//! bit-vector object DAG (component B).
//!
//! See `SPEC_FULL.md` §4.A/§4.B at the workspace root for the contract this
//! crate implements.

pub mod error;
pub mod intern;
pub mod network;
pub mod object;

pub use error::{Error, Result};
pub use intern::{NameId, NamePool, Range, RangeId, RangePool};
pub use network::{Network, TravId};
pub use object::{FaninList, Object, ObjectId, ObjectType};
