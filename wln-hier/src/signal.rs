//! Tagged signal unions (spec §3.4): every connection endpoint is one of
//! four kinds, encoded as a sum type rather than the original's two-low-bit
//! trick (spec §9 Design Notes: "implementations should prefer a sum type
//! even if the bit trick is tempting").

use crate::ids::{ConcatId, ConstId, SliceId, WireId};

/// A connection endpoint: a whole wire, an interned constant, a bit slice,
/// or a concatenation of other signals.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// References an entire wire.
    Wire(WireId),
    /// References an interned constant value.
    Const(ConstId),
    /// References an interned `[base_name, msb, lsb]` slice descriptor.
    Slice(SliceId),
    /// References an interned ordered concatenation of child signals.
    Concat(ConcatId),
}

/// `(base_name_id, msb, lsb)`, interned library-wide (spec §3.3 "slice
/// descriptor").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SliceDescriptor {
    /// Name of the signal being sliced. Stored as a name rather than a
    /// resolved [`WireId`] so slices can be parsed before their base wire's
    /// declaration is seen (spec §4.C step 2: unresolved references are
    /// reported but not fatal at parse time).
    pub base_name: wln_ir::NameId,
    /// Most-significant bit of the slice.
    pub msb: i32,
    /// Least-significant bit of the slice.
    pub lsb: i32,
}
