//! Cells: primitive operator instances and user-module instances (spec
//! §3.4).

use wln_ir::{NameId, ObjectType};

use crate::ids::ModuleId;
use crate::signal::Signal;

/// What a cell's `type` name resolved to during parent linking (spec §4.C
/// step 2). Unresolved references are kept rather than treated as a parse
/// failure, matching "reported but not fatal".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellTarget {
    /// A built-in operator (`type` began with `$`), resolved to its WLN
    /// object type.
    Operator(ObjectType),
    /// Another module in the same library.
    Module(ModuleId),
    /// A `type` name that did not resolve to either of the above by the
    /// end of parent linking.
    Unresolved(NameId),
}

/// A mark a cell may carry after hierarchy/graft commands run (spec §6.1
/// `hierarchy`/`graft`): whether this instantiation site is a blast-time
/// boundary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CellMark {
    /// Set by the `hierarchy` command; forces barrier-buffer insertion at
    /// this call site during bit-blasting (spec §4.D "Barrier-buffer
    /// insertion").
    pub boundary: bool,
}

/// `Cell = (type_name_id, instance_name_id, module_ref_or_operator_code,
/// attrs[], params[], connections[], input_count, mark)` (spec §3.4).
#[derive(Clone, Debug)]
pub struct Cell {
    /// The cell's `type` name, as written (e.g. `$add`, or a user module
    /// name), before/regardless of resolution.
    pub type_name: NameId,
    /// The cell's instance name, unique within its owning module.
    pub instance_name: NameId,
    /// What `type_name` resolved to.
    pub target: CellTarget,
    /// `attribute key value` pairs that preceded this cell in the token
    /// stream.
    pub attrs: Vec<(NameId, NameId)>,
    /// `parameter` key/value pairs (e.g. `A_SIGNED`, `B_SIGNED`).
    pub params: Vec<(NameId, NameId)>,
    /// Ordered connection list, rewritten positionally by wire reordering
    /// when `target` is a `Module` (spec §4.C step 4).
    pub connections: Vec<(NameId, Signal)>,
    /// Count of connections read as data inputs rather than outputs;
    /// consulted by bit-blasting's per-operator expanders.
    pub input_count: u32,
    /// Boundary/graft marks.
    pub mark: CellMark,
}

impl Cell {
    /// A parameter's interned value, if present.
    pub fn param(&self, key: NameId) -> Option<NameId> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// A connection's signal by its named port, if present.
    pub fn connection(&self, port: NameId) -> Option<Signal> {
        self.connections
            .iter()
            .find(|(p, _)| *p == port)
            .map(|(_, s)| *s)
    }
}
