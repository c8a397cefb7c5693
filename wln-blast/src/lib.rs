//! Bit-blasting: lowering the normalized RTL hierarchy onto a shared,
//! hash-consed AIG (component D).
//!
//! See `SPEC_FULL.md` §4.D at the workspace root for the contract this
//! crate implements.

pub mod blast;
pub mod error;
pub mod expand;
pub mod ports;
pub mod signal;

pub use blast::{BlastSession, ModuleBlast};
pub use error::{Error, Result};
