//! The library: the multi-module container above the per-module word-level
//! DAG (spec §3.4 `Lib`).

use std::collections::HashMap;

use cranelift_entity::PrimaryMap;
use wln_ir::{NameId, NamePool};

use crate::cell::CellTarget;
use crate::error::{Error, Result};
use crate::ids::ModuleId;
use crate::module::Module;
use crate::pool::{ConcatPool, ConstPool, SlicePool};

/// A saved inductive invariant, as managed by the `inv_*` CLI family (spec
/// §6.1). The invariant's logical content is an opaque textual payload
/// (typically a guidance-engine-produced clause or property string); this
/// layer only tracks ownership and naming, not its semantics.
#[derive(Clone, Debug)]
pub struct InvariantRecord {
    /// The module the invariant was proved about.
    pub module: ModuleId,
    /// A short name for `inv_get`/`inv_put` lookup.
    pub name: NameId,
    /// The invariant's textual payload.
    pub text: NameId,
}

/// `Lib = { name_pool, const_pool, slice_pool, concat_pool, modules[],
/// invariant_marks, direct_equivalences, inverse_equivalences }` (spec
/// §3.4).
#[derive(Default)]
pub struct Lib {
    name_pool: NamePool,
    const_pool: ConstPool,
    slice_pool: SlicePool,
    concat_pool: ConcatPool,
    modules: PrimaryMap<ModuleId, Module>,
    module_by_name: HashMap<NameId, ModuleId>,
    /// Enumeration order for [`Lib::modules`], set by
    /// [`Lib::set_module_order`] after topological reordering; `None`
    /// means "insertion order" (still the case before `normalize` runs).
    module_order: Option<Vec<ModuleId>>,
    /// Saved inductive invariants (`inv_*` family).
    pub invariant_marks: Vec<InvariantRecord>,
    /// Module pairs marked as direct (drop-in) equivalents by `graft`.
    pub direct_equivalences: Vec<(ModuleId, ModuleId)>,
    /// Module pairs marked as inverse equivalents (`graft -i`) — consumed
    /// by the FRAIG guidance engine's `inverse` task (spec §4.E).
    pub inverse_equivalences: Vec<(ModuleId, ModuleId)>,
}

impl Lib {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to the shared name pool.
    pub fn names(&mut self) -> &mut NamePool {
        &mut self.name_pool
    }

    /// Read-only access to the shared name pool.
    pub fn names_ro(&self) -> &NamePool {
        &self.name_pool
    }

    /// Mutable access to the shared constant pool.
    pub fn consts(&mut self) -> &mut ConstPool {
        &mut self.const_pool
    }

    /// Read-only access to the shared constant pool.
    pub fn consts_ro(&self) -> &ConstPool {
        &self.const_pool
    }

    /// Mutable access to the shared slice-descriptor pool.
    pub fn slices(&mut self) -> &mut SlicePool {
        &mut self.slice_pool
    }

    /// Read-only access to the shared slice-descriptor pool.
    pub fn slices_ro(&self) -> &SlicePool {
        &self.slice_pool
    }

    /// Mutable access to the shared concatenation pool.
    pub fn concats(&mut self) -> &mut ConcatPool {
        &mut self.concat_pool
    }

    /// Read-only access to the shared concatenation pool.
    pub fn concats_ro(&self) -> &ConcatPool {
        &self.concat_pool
    }

    /// Declare a new, empty module. Fails with `InvariantViolation` if the
    /// name is already used (spec §4.C invariant).
    pub fn add_module(&mut self, name: NameId) -> Result<ModuleId> {
        if self.module_by_name.contains_key(&name) {
            return Err(Error::InvariantViolation(format!(
                "duplicate module name {name}"
            )));
        }
        let id = self.modules.push(Module::new(name));
        self.module_by_name.insert(name, id);
        Ok(id)
    }

    /// Resolve a module by name.
    pub fn module_named(&self, name: NameId) -> Option<ModuleId> {
        self.module_by_name.get(&name).copied()
    }

    /// Look up a module, failing with `NotFound` if the id is stale (never
    /// happens for ids this library handed out, but cross-library ids are
    /// a caller error).
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Mutable access to a module.
    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id]
    }

    /// All modules and their ids, in current library order (insertion
    /// order until `normalize` reorders it topologically).
    pub fn modules(&self) -> Box<dyn Iterator<Item = (ModuleId, &Module)> + '_> {
        match &self.module_order {
            Some(order) => Box::new(order.iter().map(move |&id| (id, &self.modules[id]))),
            None => Box::new(self.modules.iter()),
        }
    }

    /// Count of modules in the library.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Replace the module table's iteration order after topological
    /// reordering (spec §4.C step 3). Ids are stable; only the order in
    /// which [`Lib::modules`] enumerates them changes, tracked as an
    /// explicit permutation rather than reshuffling the `PrimaryMap`
    /// (entity ids must stay dense and unchanged for existing
    /// `ModuleId`/`WireId`/`CellId` references to remain valid).
    pub fn set_module_order(&mut self, order: Vec<ModuleId>) {
        self.module_order = Some(order);
    }

    /// Mark `a` and `b` as direct (drop-in) equivalents.
    pub fn mark_direct_equivalence(&mut self, a: ModuleId, b: ModuleId) {
        self.direct_equivalences.push((a, b));
    }

    /// Mark `a` and `b` as inverse equivalents.
    pub fn mark_inverse_equivalence(&mut self, a: ModuleId, b: ModuleId) {
        self.inverse_equivalences.push((a, b));
    }

    /// Resolve every cell's `type_name` to a `CellTarget` (spec §4.C step
    /// 2 "Parent linking"): a built-in operator if the name begins with
    /// `$`, otherwise another module's id if one by that name exists, else
    /// left `Unresolved`.
    pub fn link_parents(&mut self) {
        let module_ids: Vec<ModuleId> = self.modules.keys().collect();
        for mid in module_ids {
            let cell_ids: Vec<_> = self.modules[mid].cells().to_vec();
            for cid in cell_ids {
                let type_name = self.modules[mid].cell(cid).type_name;
                let text = self.name_pool.get(type_name).to_vec();
                let target = if text.first() == Some(&b'$') {
                    let tag = std::str::from_utf8(&text).unwrap_or("");
                    match crate::operator::lookup(tag) {
                        Some((ty, _)) => CellTarget::Operator(ty),
                        None => CellTarget::Unresolved(type_name),
                    }
                } else if let Some(target_mod) = self.module_by_name.get(&type_name) {
                    CellTarget::Module(*target_mod)
                } else {
                    CellTarget::Unresolved(type_name)
                };
                self.modules[mid].cell_mut(cid).target = target;
            }
        }
    }

    /// Run the full normalization pipeline (spec §4.C): range
    /// normalization, parent linking, module reordering, wire reordering.
    pub fn normalize(&mut self) -> Result<()> {
        crate::normalize::normalize(self)
    }
}
