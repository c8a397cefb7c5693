//! A single module: its wires, cells, free-standing connections, and the
//! declaration order normalization rewrites (spec §3.4, §4.C).

use std::collections::HashMap;

use cranelift_entity::PrimaryMap;
use wln_ir::NameId;

use crate::cell::Cell;
use crate::ids::{CellId, WireId};
use crate::signal::Signal;
use crate::wire::Wire;

/// One entry of a module's declaration-order item list, used to recover
/// the data-flow order bit-blasting walks (spec §4.C step 3's `iCopy`
/// numbering is the module-level analogue of this item order).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModuleItem {
    /// A wire declaration.
    Wire(WireId),
    /// A cell instantiation.
    Cell(CellId),
    /// A free-standing `connect lhs rhs` statement, indexing into
    /// [`Module::connects`].
    Connect(usize),
}

/// `Module = { name_id, wires[], cells[], connections[], derived WLN-like
/// order, bit-blasted AIG?, role flags (root, boundary) }` (spec §3.4). The
/// bit-blasted AIG itself is owned by `wln-blast`'s per-session memo table,
/// not stored here.
#[derive(Clone, Debug, Default)]
pub struct Module {
    name: NameId,
    wires: PrimaryMap<WireId, Wire>,
    cells: PrimaryMap<CellId, Cell>,
    wire_order: Vec<WireId>,
    cell_order: Vec<CellId>,
    wire_by_name: HashMap<NameId, WireId>,
    /// Free-standing `connect` statements (distinct from a cell's own
    /// connection list).
    pub connects: Vec<(Signal, Signal)>,
    /// Declaration-order item list.
    pub items: Vec<ModuleItem>,
    /// Set by `hierarchy`/hierarchy-equivalent ingest: this module is a
    /// top-level root for a blast/collapse invocation.
    pub is_root: bool,
    /// Set by `hierarchy`/`graft`: every instantiation of this module gets
    /// barrier buffers at blast time.
    pub is_boundary: bool,
}

impl Module {
    /// An empty module with the given name.
    pub fn new(name: NameId) -> Self {
        Module {
            name,
            ..Default::default()
        }
    }

    /// The module's interned name.
    pub fn name(&self) -> NameId {
        self.name
    }

    /// Declare a wire, recording it in declaration order, and return its
    /// id. Fails (by returning `None`) if the name is already used in this
    /// module (spec §4.C invariant: "names inside a module are unique").
    pub fn add_wire(&mut self, wire: Wire) -> Option<WireId> {
        if self.wire_by_name.contains_key(&wire.name) {
            return None;
        }
        let name = wire.name;
        let id = self.wires.push(wire);
        self.wire_order.push(id);
        self.wire_by_name.insert(name, id);
        self.items.push(ModuleItem::Wire(id));
        Some(id)
    }

    /// Instantiate a cell, recording it in declaration order.
    pub fn add_cell(&mut self, cell: Cell) -> CellId {
        let id = self.cells.push(cell);
        self.cell_order.push(id);
        self.items.push(ModuleItem::Cell(id));
        id
    }

    /// Record a free-standing `connect lhs rhs` statement.
    pub fn add_connect(&mut self, lhs: Signal, rhs: Signal) {
        let idx = self.connects.len();
        self.connects.push((lhs, rhs));
        self.items.push(ModuleItem::Connect(idx));
    }

    /// Resolve a wire by name.
    pub fn wire_named(&self, name: NameId) -> Option<WireId> {
        self.wire_by_name.get(&name).copied()
    }

    /// A wire's declaration.
    pub fn wire(&self, id: WireId) -> &Wire {
        &self.wires[id]
    }

    /// Mutable access to a wire's declaration (used by range
    /// normalization).
    pub fn wire_mut(&mut self, id: WireId) -> &mut Wire {
        &mut self.wires[id]
    }

    /// A cell's declaration.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    /// Mutable access to a cell (used by parent linking and wire
    /// reordering's positional connection rewrite).
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id]
    }

    /// Wires, in current declaration order.
    pub fn wires(&self) -> &[WireId] {
        &self.wire_order
    }

    /// Cells, in declaration order.
    pub fn cells(&self) -> &[CellId] {
        &self.cell_order
    }

    /// Replace the wire declaration order (used by wire reordering). The
    /// name index is rebuilt trivially since ids, not names, are
    /// reordered.
    pub fn set_wire_order(&mut self, order: Vec<WireId>) {
        debug_assert_eq!(order.len(), self.wire_order.len());
        self.wire_order = order;
    }
}
