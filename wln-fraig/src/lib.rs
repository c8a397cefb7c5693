//! Hash-consed AIG, simulation, SAT sweeping, and guidance-driven
//! hierarchical proof (component E).
//!
//! See `SPEC_FULL.md` §4.E at the workspace root for the contract this
//! crate implements.

pub mod aig;
pub mod cover;
pub mod error;
pub mod guide;
pub mod sat_sweep;
pub mod sim;

pub use aig::{Aig, AigId, AigLit, BarrierEntry, NodeKind, NodeState, Side};
pub use error::{Error, Result};
pub use guide::{
    parse_guidance, prove_equal, prove_inverse, prove_property, run_guidance, GuidanceTask,
    ModulePorts, TaskKind, TaskOutcome, Verb,
};
pub use sat_sweep::{are_equivalent, in_tfi, EquivOutcome};
