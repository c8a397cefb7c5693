//! Library-wide interned pools: constants, slice descriptors, and
//! concatenations. Each follows the same forward-`PrimaryMap` /
//! reverse-`HashMap` dedup shape `wln_ir::intern::RangePool`/`NamePool`
//! use.

use std::collections::HashMap;

use cranelift_entity::PrimaryMap;
use wln_ir::NameId;

use crate::ids::{ConcatId, ConstId, SliceId};
use crate::signal::{Signal, SliceDescriptor};

/// A constant's parsed form (spec §4.C "Parsing"): either a sized bit
/// literal (`<width>'b<bits>`) or an untyped decimal pair stored as
/// `(-1, value)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstValue {
    /// Declared width, or `-1` for an untyped decimal constant.
    pub width: i32,
    /// Canonical textual form, e.g. `8'b00000001` or `42` (spec §6.4).
    pub text: NameId,
}

/// Dedupes constant values by `(width, text)`.
#[derive(Default)]
pub struct ConstPool {
    forward: PrimaryMap<ConstId, ConstValue>,
    reverse: HashMap<(i32, NameId), ConstId>,
}

impl ConstPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a constant value, returning the same id for equal values.
    pub fn intern(&mut self, value: ConstValue) -> ConstId {
        if let Some(&id) = self.reverse.get(&(value.width, value.text)) {
            return id;
        }
        let id = self.forward.push(value);
        self.reverse.insert((value.width, value.text), id);
        id
    }

    /// Resolve an id back to its value.
    pub fn get(&self, id: ConstId) -> ConstValue {
        self.forward[id]
    }
}

/// Dedupes `(base_name, msb, lsb)` slice descriptors.
#[derive(Default)]
pub struct SlicePool {
    forward: PrimaryMap<SliceId, SliceDescriptor>,
    reverse: HashMap<SliceDescriptor, SliceId>,
}

impl SlicePool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a slice descriptor, returning the same id for equal triples.
    pub fn intern(&mut self, desc: SliceDescriptor) -> SliceId {
        if let Some(&id) = self.reverse.get(&desc) {
            return id;
        }
        let id = self.forward.push(desc);
        self.reverse.insert(desc, id);
        id
    }

    /// Resolve an id back to its descriptor.
    pub fn get(&self, id: SliceId) -> SliceDescriptor {
        self.forward[id]
    }

    /// Mutable access, used by range normalization to rewrite descriptors
    /// in place (offset subtraction, `upto` endpoint swap).
    pub fn get_mut(&mut self, id: SliceId) -> &mut SliceDescriptor {
        &mut self.forward[id]
    }

    /// Iterate all interned descriptors by id.
    pub fn iter(&self) -> impl Iterator<Item = (SliceId, &SliceDescriptor)> {
        self.forward.iter()
    }
}

/// Dedupes ordered concatenation lists. Concatenations are not deduped by
/// structural equality with the same aggressiveness as constants/slices
/// (two textually distinct `{ ... }` forms are rarely worth comparing
/// elementwise), so `intern` simply allocates; callers that build the same
/// concat twice get two distinct, equal-valued entries.
#[derive(Default)]
pub struct ConcatPool {
    forward: PrimaryMap<ConcatId, Vec<Signal>>,
}

impl ConcatPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new concatenation from its ordered children.
    pub fn intern(&mut self, children: Vec<Signal>) -> ConcatId {
        self.forward.push(children)
    }

    /// Resolve an id back to its ordered children.
    pub fn get(&self, id: ConcatId) -> &[Signal] {
        &self.forward[id]
    }
}
