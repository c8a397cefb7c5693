//! The word-level network: a typed DAG of bit-vector objects, with
//! acyclicity, fanin/fanout, DFS, and duplication infrastructure (spec
//! §4.B). Modeled on `cranelift-codegen`'s `DataFlowGraph` (primary storage
//! plus side tables) and `dominator_tree.rs`'s traversal-epoch counter.

use std::collections::HashMap;

use cranelift_entity::{PrimaryMap, SecondaryMap};
use log::trace;

use crate::error::{Error, Result};
use crate::intern::{NameId, NamePool, RangeId, RangePool};
use crate::object::{FaninList, Object, ObjectId, ObjectType};

/// A traversal epoch. Traversals bump a single counter on the `Network`
/// instead of clearing per-node visited flags, avoiding an O(N) reset on
/// every DFS (spec §9 Design Notes: "Global mutable state (TravIds)").
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct TravId(u32);

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    /// On the current DFS stack (gray).
    Open(TravId),
    /// Fully processed (black).
    Done(TravId),
}

/// A word-level network: one module's worth of combinational + sequential
/// bit-vector logic.
pub struct Network {
    name: String,
    ranges: RangePool,
    names: NamePool,
    objects: PrimaryMap<ObjectId, Object>,
    cis: Vec<ObjectId>,
    cos: Vec<ObjectId>,
    ffs: Vec<ObjectId>,
    cio_index: SecondaryMap<ObjectId, u32>,
    type_counts: HashMap<ObjectType, u32>,
    trav_counter: u32,
    marks: SecondaryMap<ObjectId, Option<Mark>>,
    copy: SecondaryMap<ObjectId, Option<ObjectId>>,
    fanouts: Option<Vec<Vec<ObjectId>>>,
}

impl Network {
    /// Create an empty network with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        let mut objects = PrimaryMap::new();
        // Reserve index 0 for `ObjectId::NULL`.
        objects.push(Object::new(
            ObjectType::NONE,
            RangeId::from_u32(0),
            false,
        ));
        Network {
            name: name.into(),
            ranges: RangePool::new(),
            names: NamePool::new(),
            objects,
            cis: Vec::new(),
            cos: Vec::new(),
            ffs: Vec::new(),
            cio_index: SecondaryMap::new(),
            type_counts: HashMap::new(),
            trav_counter: 0,
            marks: SecondaryMap::new(),
            copy: SecondaryMap::new(),
            fanouts: None,
        }
    }

    /// The network's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mutable access to the range pool (for callers that need to intern a
    /// range ahead of calling [`Network::new_object`]).
    pub fn ranges(&mut self) -> &mut RangePool {
        &mut self.ranges
    }

    /// Mutable access to the name pool.
    pub fn names(&mut self) -> &mut NamePool {
        &mut self.names
    }

    /// Number of objects, including the reserved null slot.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Iterate live object ids (excludes the reserved null slot).
    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().skip(1)
    }

    /// Resolve an object.
    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id]
    }

    /// CI objects, in insertion order.
    pub fn cis(&self) -> &[ObjectId] {
        &self.cis
    }

    /// CO objects, in insertion order.
    pub fn cos(&self) -> &[ObjectId] {
        &self.cos
    }

    /// DFF (`DFFRSE`) objects, in insertion order.
    pub fn ffs(&self) -> &[ObjectId] {
        &self.ffs
    }

    /// The zero-based index of a CI/CO/DFF object into its side-table
    /// (spec §3.3: "fanin slot 1 holds the zero-based index").
    pub fn cio_index(&self, id: ObjectId) -> Option<u32> {
        self.cio_index.get(id).copied()
    }

    /// Count of live objects of a given type.
    pub fn type_count(&self, ty: ObjectType) -> u32 {
        self.type_counts.get(&ty).copied().unwrap_or(0)
    }

    /// Allocate a new object, intern its range, and register it on the
    /// appropriate side-table if it is a CI/CO/DFF (spec §4.B `new_object`).
    /// Only failure mode is allocator exhaustion, which we do not model as
    /// a typed error (spec: "cannot fail except on OutOfMemory").
    pub fn new_object(&mut self, ty: ObjectType, signed: bool, msb: i32, lsb: i32) -> ObjectId {
        let range = self.ranges.intern(msb, lsb);
        let obj = Object::new(ty, range, signed);
        let id = self.objects.push(obj);
        *self.type_counts.entry(ty).or_insert(0) += 1;
        if ty.is_ci() {
            self.cio_index[id] = self.cis.len() as u32;
            self.cis.push(id);
        } else if ty.is_co() {
            self.cio_index[id] = self.cos.len() as u32;
            self.cos.push(id);
        } else if ty.is_dff() {
            self.cio_index[id] = self.ffs.len() as u32;
            self.ffs.push(id);
        }
        trace!("new_object {id} : {ty:?} [{msb}:{lsb}] signed={signed}");
        id
    }

    /// Give an object an explicit name.
    pub fn set_name(&mut self, id: ObjectId, name: NameId) {
        self.objects[id].name = name;
    }

    /// Set fanin 0 of a `CONST` object to the interned string form of the
    /// constant (spec §3.3).
    pub fn set_const(&mut self, id: ObjectId, text: NameId) -> Result<()> {
        if self.objects[id].ty != ObjectType::CONST {
            return Err(Error::InvariantViolation(format!(
                "set_const on non-CONST object {id}"
            )));
        }
        let obj = &mut self.objects[id];
        obj.fanins = FaninList::from_elem(ObjectId::from_u32(text.as_u32()), 1);
        Ok(())
    }

    /// Append `fanin_id` to `id`'s ordered fanin list (spec §4.B
    /// `add_fanin`). Preserves insertion order. Fails with
    /// `InvariantViolation` for a zero fanin id on a non-designated slot,
    /// or a slot whose type never accepts fanins (`CONST`, `NONE`).
    pub fn add_fanin(&mut self, id: ObjectId, fanin_id: ObjectId) -> Result<()> {
        let ty = self.objects[id].ty;
        if !ty.accepts_fanin() {
            return Err(Error::InvariantViolation(format!(
                "add_fanin to {id} of type {ty:?}, which does not accept fanins"
            )));
        }
        if fanin_id.is_null() {
            return Err(Error::InvariantViolation(format!(
                "add_fanin({id}, 0): zero fanin id on a non-designated slot"
            )));
        }
        self.objects[id].fanins.push(fanin_id);
        Ok(())
    }

    fn bump_trav(&mut self) -> TravId {
        self.trav_counter += 1;
        TravId(self.trav_counter)
    }

    /// Two-color DFS acyclicity check over the combinational subgraph,
    /// starting from every CO and every DFF (spec §4.B `acyclicity_check`,
    /// §8 property 3). Reports, but never mutates the network.
    pub fn acyclicity_check(&self) -> Result<()> {
        let trav = self.trav_counter + 1;
        let mut marks: SecondaryMap<ObjectId, Option<Mark>> = SecondaryMap::new();
        let mut roots: Vec<ObjectId> = self.cos.iter().chain(self.ffs.iter()).copied().collect();
        roots.sort_by_key(|id| id.as_u32());
        for root in roots {
            if let Some(path) = Self::dfs_find_cycle(self, &mut marks, TravId(trav), root, &mut Vec::new())
            {
                let object = *path.last().unwrap();
                return Err(Error::Cycle { object, path });
            }
        }
        Ok(())
    }

    /// DFS from a root (a CO, or a DFFRSE whose *own* D/reset/set/enable
    /// cone is being checked). The root's real fanins are always explored,
    /// even when the root itself is a DFFRSE; any DFFRSE reached *while
    /// descending* acts as a sequential cut point (its Q output has no
    /// combinational fanin from the perspective of whoever references it)
    /// and is treated as a leaf, so referencing a register's own output
    /// from its next-state logic — the ordinary counter pattern — is never
    /// flagged as a cycle.
    fn dfs_find_cycle(
        &self,
        marks: &mut SecondaryMap<ObjectId, Option<Mark>>,
        trav: TravId,
        start: ObjectId,
        path: &mut Vec<ObjectId>,
    ) -> Option<Vec<ObjectId>> {
        marks[start] = Some(Mark::Open(trav));
        path.push(start);
        let result = self.dfs_interior(marks, trav, self.object(start).fanins(), path);
        if result.is_none() {
            marks[start] = Some(Mark::Done(trav));
            path.pop();
        }
        result
    }

    /// Iterative interior DFS: explore `roots` and everything they
    /// transitively depend on, treating every `DFFRSE` encountered as a
    /// leaf (spec §3.3: a flop's Q output cuts the combinational cone).
    fn dfs_interior(
        &self,
        marks: &mut SecondaryMap<ObjectId, Option<Mark>>,
        trav: TravId,
        roots: &[ObjectId],
        path: &mut Vec<ObjectId>,
    ) -> Option<Vec<ObjectId>> {
        enum Frame {
            Enter(ObjectId),
            Leave(ObjectId),
        }
        let mut stack: Vec<Frame> = roots.iter().rev().map(|&id| Frame::Enter(id)).collect();
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id) => {
                    if id.is_null() {
                        continue;
                    }
                    match marks.get(id).copied().flatten() {
                        Some(Mark::Done(t)) if t == trav => continue,
                        Some(Mark::Open(t)) if t == trav => {
                            path.push(id);
                            return Some(path.clone());
                        }
                        _ => {}
                    }
                    let obj = self.object(id);
                    if obj.ty == ObjectType::DFFRSE {
                        // Reached via a fanin reference (as opposed to
                        // being the root this interior walk started from):
                        // a DFF's Q output is a sequential cut point, so it
                        // contributes no combinational fanins and can never
                        // itself be "open" in a way that indicates a real
                        // comb cycle. Skip marking/pushing entirely rather
                        // than running it through the Open/Done check,
                        // since the root that owns this DFF may legitimately
                        // still be Open on the stack above us.
                        continue;
                    }
                    match marks.get(id).copied().flatten() {
                        Some(Mark::Done(t)) if t == trav => continue,
                        Some(Mark::Open(t)) if t == trav => {
                            path.push(id);
                            return Some(path.clone());
                        }
                        _ => {}
                    }
                    marks[id] = Some(Mark::Open(trav));
                    path.push(id);
                    stack.push(Frame::Leave(id));
                    let fanins: &[ObjectId] = if obj.ty == ObjectType::CONST {
                        &[]
                    } else {
                        obj.fanins()
                    };
                    for &fin in fanins.iter().rev() {
                        stack.push(Frame::Enter(fin));
                    }
                }
                Frame::Leave(id) => {
                    marks[id] = Some(Mark::Done(trav));
                    path.pop();
                }
            }
        }
        None
    }

    /// Deep-copy the combinational subgraph plus DFFs/COs into a fresh
    /// network, visiting CI → DFF → CO roots in that order (spec §4.B
    /// `duplicate_dfs`). DFF bodies are deferred: DFFs are cloned without
    /// fanins first, and their fanins are rewired once the whole
    /// combinational copy is complete.
    pub fn duplicate_dfs(&self) -> Network {
        let mut dst = Network::new(self.name.clone());
        let mut copy: SecondaryMap<ObjectId, Option<ObjectId>> = SecondaryMap::new();

        // Pass 1: CIs (no fanins to chase).
        for &ci in &self.cis {
            let new_id = Self::clone_shell(self, &mut dst, ci);
            copy[ci] = Some(new_id);
        }

        // Pass 2: DFFs, shells only (fanins deferred).
        for &ff in &self.ffs {
            let new_id = Self::clone_shell(self, &mut dst, ff);
            copy[ff] = Some(new_id);
        }

        // Pass 3: combinational DFS from every CO, cloning as we go.
        for &co in &self.cos {
            Self::copy_dfs(self, &mut dst, &mut copy, co);
        }

        // Pass 4: rewrite DFF fanins now that the combinational copy map is
        // complete, and rewrite CO fanins too (a CO's fanin is
        // combinational and was cloned in pass 3, but we still look it up
        // through `copy`).
        for &ff in &self.ffs {
            let old_id = ff;
            let new_id = copy[old_id].unwrap();
            for &fin in self.object(old_id).fanins() {
                if fin.is_null() {
                    dst.add_fanin(new_id, ObjectId::NULL).ok();
                    continue;
                }
                Self::copy_dfs(self, &mut dst, &mut copy, fin);
                let new_fin = copy[fin].unwrap();
                dst.objects[new_id].fanins.push(new_fin);
            }
        }

        dst
    }

    /// Clone `id`'s type/range/signedness/name into `dst` without any
    /// fanins, registering it on `dst`'s side-tables as appropriate, and
    /// return the new id.
    fn clone_shell(src: &Network, dst: &mut Network, id: ObjectId) -> ObjectId {
        let obj = src.object(id);
        let range = src.ranges.get(obj.range);
        let new_id = dst.new_object(obj.ty, obj.signed, range.msb, range.lsb);
        if obj.name != NameId::NONE {
            let bytes = src.names.get(obj.name).to_vec();
            let name = dst.names.intern(&bytes);
            dst.set_name(new_id, name);
        }
        new_id
    }

    /// Recursively copy `id` and everything it depends on (memoized via
    /// `copy`), returning once `copy[id]` is populated.
    fn copy_dfs(
        src: &Network,
        dst: &mut Network,
        copy: &mut SecondaryMap<ObjectId, Option<ObjectId>>,
        id: ObjectId,
    ) {
        if copy.get(id).copied().flatten().is_some() {
            return;
        }
        let obj = src.object(id);
        if obj.ty == ObjectType::DFFRSE {
            // Shell must already exist from pass 2; fanins deferred.
            return;
        }
        if obj.ty == ObjectType::CONST {
            let new_id = Self::clone_shell(src, dst, id);
            // fanin 0 is a name id smuggled through an ObjectId; copy
            // verbatim (it is not a real object reference).
            dst.objects[new_id].fanins = obj.fanins.clone();
            copy[id] = Some(new_id);
            return;
        }
        for &fin in obj.fanins() {
            if !fin.is_null() {
                Self::copy_dfs(src, dst, copy, fin);
            }
        }
        let new_id = Self::clone_shell(src, dst, id);
        for &fin in obj.fanins() {
            let new_fin = if fin.is_null() {
                ObjectId::NULL
            } else {
                copy[fin].unwrap()
            };
            dst.objects[new_id].fanins.push(new_fin);
        }
        copy[id] = Some(new_id);
    }

    /// Count incoming edges for every object and build the fanout map,
    /// inserted in the same order as the forward walk so iteration is
    /// deterministic (spec §4.B `refs/rebuild_fanouts`).
    pub fn rebuild_fanouts(&mut self) {
        let mut fanouts: Vec<Vec<ObjectId>> = vec![Vec::new(); self.objects.len()];
        for id in self.object_ids() {
            let obj = self.object(id);
            let fanins: &[ObjectId] = if obj.ty == ObjectType::CONST {
                &[]
            } else {
                obj.fanins()
            };
            for &fin in fanins {
                if !fin.is_null() {
                    fanouts[fin.as_u32() as usize].push(id);
                }
            }
        }
        self.fanouts = Some(fanouts);
    }

    /// Fanout list for `id`; empty until [`Network::rebuild_fanouts`] has
    /// been called at least once since the last structural change.
    pub fn fanouts(&self, id: ObjectId) -> &[ObjectId] {
        match &self.fanouts {
            Some(f) => &f[id.as_u32() as usize],
            None => &[],
        }
    }

    /// Ref-count derived from the fanout map.
    pub fn ref_count(&self, id: ObjectId) -> usize {
        self.fanouts(id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_and_network() -> (Network, ObjectId, ObjectId, ObjectId) {
        let mut net = Network::new("m");
        let a = net.new_object(ObjectType::CI, false, 0, 0);
        let b = net.new_object(ObjectType::CI, false, 0, 0);
        let and = net.new_object(ObjectType::AND, false, 0, 0);
        net.add_fanin(and, a).unwrap();
        net.add_fanin(and, b).unwrap();
        let co = net.new_object(ObjectType::CO, false, 0, 0);
        net.add_fanin(co, and).unwrap();
        (net, a, b, and)
    }

    #[test]
    fn acyclic_network_is_ok() {
        let (net, ..) = simple_and_network();
        assert!(net.acyclicity_check().is_ok());
    }

    #[test]
    fn injected_cycle_is_detected() {
        // w1 = AND(w2, pi); w2 = AND(w1, pi) — spec §8 scenario 6.
        let mut net = Network::new("m");
        let pi = net.new_object(ObjectType::CI, false, 0, 0);
        let w1 = net.new_object(ObjectType::AND, false, 0, 0);
        let w2 = net.new_object(ObjectType::AND, false, 0, 0);
        net.add_fanin(w2, w1).unwrap();
        net.add_fanin(w2, pi).unwrap();
        net.add_fanin(w1, w2).unwrap();
        net.add_fanin(w1, pi).unwrap();
        let co = net.new_object(ObjectType::CO, false, 0, 0);
        net.add_fanin(co, w1).unwrap();

        let err = net.acyclicity_check().unwrap_err();
        match err {
            Error::Cycle { path, .. } => {
                assert!(path.contains(&w1));
                assert!(path.contains(&w2));
            }
            _ => panic!("expected Cycle"),
        }
    }

    #[test]
    fn add_fanin_rejects_null() {
        let mut net = Network::new("m");
        let and = net.new_object(ObjectType::AND, false, 0, 0);
        assert!(net.add_fanin(and, ObjectId::NULL).is_err());
    }

    #[test]
    fn add_fanin_rejects_const() {
        let mut net = Network::new("m");
        let a = net.new_object(ObjectType::CI, false, 0, 0);
        let c = net.new_object(ObjectType::CONST, false, 0, 0);
        assert!(net.add_fanin(c, a).is_err());
    }

    #[test]
    fn duplicate_preserves_shape() {
        let (net, ..) = simple_and_network();
        let dup = net.duplicate_dfs();
        assert_eq!(dup.cis().len(), net.cis().len());
        assert_eq!(dup.cos().len(), net.cos().len());
        for (&src_id, &dst_id) in net.cis().iter().zip(dup.cis().iter()) {
            let s = net.object(src_id);
            let d = dup.object(dst_id);
            assert_eq!(s.ty(), d.ty());
            assert_eq!(s.is_signed(), d.is_signed());
            assert_eq!(s.fanins().len(), d.fanins().len());
        }
        assert!(dup.acyclicity_check().is_ok());
    }

    #[test]
    fn rebuild_fanouts_is_deterministic_and_matches_refcount() {
        let (mut net, a, b, and) = simple_and_network();
        net.rebuild_fanouts();
        assert_eq!(net.ref_count(a), 1);
        assert_eq!(net.ref_count(b), 1);
        assert_eq!(net.ref_count(and), 1);
        assert_eq!(net.fanouts(a), &[and]);
    }
}
