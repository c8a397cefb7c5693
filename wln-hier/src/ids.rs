//! Entity ids for the hierarchy layer, in the same `entity_impl!` style
//! `wln-ir` uses for `ObjectId`/`RangeId`/`NameId`.

use cranelift_entity::entity_impl;

/// A module within a [`crate::library::Lib`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);
entity_impl!(ModuleId, "mod");

/// A wire within one module.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WireId(u32);
entity_impl!(WireId, "wire");

/// A cell (primitive or module instance) within one module.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u32);
entity_impl!(CellId, "cell");

/// An interned constant value, library-wide.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstId(u32);
entity_impl!(ConstId, "const");

/// An interned slice descriptor `(base_name, msb, lsb)`, library-wide.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SliceId(u32);
entity_impl!(SliceId, "slice");

/// An interned concatenation `[sig, sig, ...]`, library-wide.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConcatId(u32);
entity_impl!(ConcatId, "concat");
