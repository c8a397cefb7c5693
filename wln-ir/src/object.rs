//! The word-level network object: a single typed DAG node (spec §3.2).

use cranelift_entity::entity_impl;
use smallvec::SmallVec;

use crate::intern::{NameId, RangeId};

/// A 1-based reference to a [`Object`] in a [`crate::network::Network`].
/// `0` is reserved to mean "null" (spec §3.2).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);
entity_impl!(ObjectId, "n");

impl ObjectId {
    /// The reserved null reference.
    pub const NULL: ObjectId = ObjectId(0);

    /// Whether this is the reserved null reference.
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

/// The closed set of word-level operator/role tags (spec §3.2).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum ObjectType {
    /// Placeholder: slot not yet given a real type.
    NONE,
    /// Combinational input (primary input bit-vector).
    CI,
    /// Combinational output (primary output bit-vector).
    CO,
    /// Fanout marker, used when an object's value is shared and must be
    /// referenced from more than the two inline fanin slots.
    FON,
    /// A constant, string form stored via fanin 0's name id.
    CONST,
    SLICE,
    CONCAT,
    BUF,
    INV,
    AND,
    OR,
    XOR,
    NAND,
    NOR,
    NXOR,
    RED_AND,
    RED_OR,
    RED_XOR,
    RED_NAND,
    RED_NOR,
    RED_NXOR,
    LOGIC_NOT,
    LOGIC_AND,
    LOGIC_OR,
    LOGIC_XOR,
    LOGIC_IMPL,
    /// Bit mux: `sel ? b : a`.
    MUX,
    /// N-way mux, `2^k` data inputs selected by a `k`-bit selector.
    NMUX,
    /// One-hot/priority mux.
    PMUX,
    DECODER,
    ADD,
    SUB,
    ADDSUB,
    MUL,
    DIV,
    MOD,
    REM,
    POW,
    SQRT,
    SQUARE,
    /// Unary negate.
    MIN,
    SHIFT_L,
    SHIFT_R,
    SHIFT_LA,
    SHIFT_RA,
    SHIFT_ROTL,
    SHIFT_ROTR,
    SIGNEXT,
    ZEROPAD,
    COMP_EQU,
    COMP_NOTEQU,
    COMP_LESS,
    COMP_LESSEQU,
    COMP_MORE,
    COMP_MOREEQU,
    /// ROM lookup.
    TABLE,
    LUT,
    RAMR,
    RAMW,
    /// Flop with reset/set/enable.
    DFFRSE,
}

impl ObjectType {
    /// Whether this type participates in the CI side-table (spec §3.3).
    pub fn is_ci(self) -> bool {
        matches!(self, ObjectType::CI)
    }

    /// Whether this type participates in the CO side-table.
    pub fn is_co(self) -> bool {
        matches!(self, ObjectType::CO)
    }

    /// Whether this type participates in the DFF side-table.
    pub fn is_dff(self) -> bool {
        matches!(self, ObjectType::DFFRSE)
    }

    /// Whether this type ever accepts fanins added via [`crate::network::Network::add_fanin`].
    /// `CONST` fanin 0 is a name id, not an object, and is set at
    /// construction time rather than appended to (spec §4.B failure
    /// semantics: "add_fanin to a slot whose type does not accept fanins
    /// ... fails").
    pub fn accepts_fanin(self) -> bool {
        !matches!(self, ObjectType::CONST | ObjectType::NONE)
    }
}

/// Fanins beyond the first two spill from the inline small-buffer into a
/// heap `Vec` — the same SBO trick `cranelift-codegen`'s `InstructionData`
/// applies to instruction operands via `ValueList`, and the one
/// `Wln_ObjAddFanin` uses directly in the ABC original (`wlnObj.c`: two
/// inline array slots, then a realloc'd array beyond that).
pub type FaninList = SmallVec<[ObjectId; 2]>;

/// A single word-level network node.
#[derive(Clone, Debug)]
pub struct Object {
    pub(crate) ty: ObjectType,
    pub(crate) range: RangeId,
    pub(crate) signed: bool,
    pub(crate) fanins: FaninList,
    pub(crate) name: NameId,
}

impl Object {
    pub(crate) fn new(ty: ObjectType, range: RangeId, signed: bool) -> Self {
        Object {
            ty,
            range,
            signed,
            fanins: FaninList::new(),
            name: NameId::NONE,
        }
    }

    /// The object's type tag.
    pub fn ty(&self) -> ObjectType {
        self.ty
    }

    /// The object's interned range id.
    pub fn range(&self) -> RangeId {
        self.range
    }

    /// Whether the object's value is interpreted as signed.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Ordered fanins, in insertion order (spec §3.2: `Wln_ObjAddFanin`
    /// preserves insertion order).
    pub fn fanins(&self) -> &[ObjectId] {
        &self.fanins
    }

    /// The object's name id, or `NameId::NONE` if unnamed.
    pub fn name(&self) -> NameId {
        self.name
    }
}
