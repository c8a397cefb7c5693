//! The four-step normalization pipeline (spec §4.C "Normalization
//! pipeline"), run in order by [`crate::library::Lib::normalize`]: range
//! normalization, parent linking, module reordering, wire reordering.

use std::collections::HashMap;

use crate::cell::CellTarget;
use crate::error::Result;
use crate::ids::{CellId, ModuleId, WireId};
use crate::library::Lib;
use crate::module::Module;
use crate::pool::ConcatPool;
use crate::signal::Signal;
use crate::wire::WireIo;

/// Run all four normalization steps, in order.
pub fn normalize(lib: &mut Lib) -> Result<()> {
    range_normalize(lib);
    lib.link_parents();
    reorder_modules(lib);
    reorder_wires(lib);
    Ok(())
}

fn collect_signal_slices(sig: Signal, concats: &ConcatPool, out: &mut Vec<crate::ids::SliceId>) {
    match sig {
        Signal::Slice(id) => out.push(id),
        Signal::Concat(id) => {
            for &child in concats.get(id) {
                collect_signal_slices(child, concats, out);
            }
        }
        Signal::Wire(_) | Signal::Const(_) => {}
    }
}

fn collect_module_slices(module: &Module, concats: &ConcatPool) -> Vec<crate::ids::SliceId> {
    let mut ids = Vec::new();
    for &(lhs, rhs) in &module.connects {
        collect_signal_slices(lhs, concats, &mut ids);
        collect_signal_slices(rhs, concats, &mut ids);
    }
    for &cid in module.cells() {
        for &(_, sig) in &module.cell(cid).connections {
            collect_signal_slices(sig, concats, &mut ids);
        }
    }
    ids
}

/// Step 1: subtract each wire's offset from every slice descriptor that
/// references it, and clear `upto` by swapping slice endpoints. Wires are
/// left with `offset = 0`, `upto = false` afterwards so re-running
/// normalization is a no-op.
fn range_normalize(lib: &mut Lib) {
    let module_ids: Vec<ModuleId> = lib.modules().map(|(id, _)| id).collect();
    for mid in module_ids {
        let slice_ids = collect_module_slices(lib.module(mid), lib.concats_ro());
        let wire_ids: Vec<WireId> = lib.module(mid).wires().to_vec();
        for wid in wire_ids {
            let wire = *lib.module(mid).wire(wid);
            if wire.offset == 0 && !wire.upto {
                continue;
            }
            for &sid in &slice_ids {
                let mut desc = lib.slices_ro().get(sid);
                if desc.base_name != wire.name {
                    continue;
                }
                if wire.offset != 0 {
                    desc.msb -= wire.offset;
                    desc.lsb -= wire.offset;
                }
                if wire.upto {
                    std::mem::swap(&mut desc.msb, &mut desc.lsb);
                }
                *lib.slices().get_mut(sid) = desc;
            }
            let w = lib.module_mut(mid).wire_mut(wid);
            w.offset = 0;
            w.upto = false;
        }
    }
}

/// Step 3: topological order, leaves (modules with no sub-instances) first,
/// via an iterative post-order DFS over the "instantiates" edge.
fn reorder_modules(lib: &mut Lib) {
    let ids: Vec<ModuleId> = lib.modules().map(|(id, _)| id).collect();
    let n = ids.len();
    let mut visited = vec![false; n];
    let mut order: Vec<ModuleId> = Vec::with_capacity(n);

    enum Frame {
        Enter(ModuleId),
        Leave(ModuleId),
    }

    for root in ids {
        if visited[root.as_u32() as usize] {
            continue;
        }
        let mut stack = vec![Frame::Enter(root)];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(mid) => {
                    let idx = mid.as_u32() as usize;
                    if visited[idx] {
                        continue;
                    }
                    visited[idx] = true;
                    stack.push(Frame::Leave(mid));
                    for &cid in lib.module(mid).cells() {
                        if let CellTarget::Module(dep) = lib.module(mid).cell(cid).target {
                            if !visited[dep.as_u32() as usize] {
                                stack.push(Frame::Enter(dep));
                            }
                        }
                    }
                }
                Frame::Leave(mid) => order.push(mid),
            }
        }
    }
    lib.set_module_order(order);
}

/// Step 4: per module, permute wires to inputs (ascending input number),
/// then outputs (ascending output number), then internals in original
/// order; rewrite every upstream instantiating cell's connection list to
/// match positionally.
fn reorder_wires(lib: &mut Lib) {
    let ids: Vec<ModuleId> = lib.modules().map(|(id, _)| id).collect();
    for &mid in &ids {
        let old_order: Vec<WireId> = lib.module(mid).wires().to_vec();
        let mut inputs: Vec<(u32, WireId)> = Vec::new();
        let mut outputs: Vec<(u32, WireId)> = Vec::new();
        let mut internals: Vec<WireId> = Vec::new();
        for &wid in &old_order {
            match lib.module(mid).wire(wid).io {
                WireIo::Input(n) => inputs.push((n, wid)),
                WireIo::Output(n) => outputs.push((n, wid)),
                WireIo::Internal => internals.push(wid),
            }
        }
        inputs.sort_by_key(|(n, _)| *n);
        outputs.sort_by_key(|(n, _)| *n);

        let mut new_order: Vec<WireId> = Vec::with_capacity(old_order.len());
        new_order.extend(inputs.into_iter().map(|(_, w)| w));
        new_order.extend(outputs.into_iter().map(|(_, w)| w));
        new_order.extend(internals);

        let port_names: Vec<_> = new_order
            .iter()
            .map(|&w| lib.module(mid).wire(w).name)
            .collect();
        lib.module_mut(mid).set_wire_order(new_order);

        for &caller in &ids {
            let cell_ids: Vec<CellId> = lib.module(caller).cells().to_vec();
            for cid in cell_ids {
                let targets_mid =
                    matches!(lib.module(caller).cell(cid).target, CellTarget::Module(m) if m == mid);
                if !targets_mid {
                    continue;
                }
                let cell = lib.module_mut(caller).cell_mut(cid);
                let mut by_name: HashMap<_, _> = cell.connections.drain(..).collect();
                let mut rebuilt = Vec::with_capacity(port_names.len());
                for &name in &port_names {
                    if let Some(sig) = by_name.remove(&name) {
                        rebuilt.push((name, sig));
                    }
                }
                cell.connections = rebuilt;
            }
        }
    }
}
