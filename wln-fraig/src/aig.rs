//! The hash-consed AIG (spec §3.5, §4.E). One arena per miter/job: an
//! object pool of nodes keyed by stable integer ids (spec §9 Design Notes:
//! "Implementations should use an arena of nodes keyed by integer IDs,
//! with all link fields being `Option<NodeId>`"), with a structural hash
//! table and two functional hash tables layered on top.

use std::collections::HashMap;

use cranelift_entity::{entity_impl, PrimaryMap};
use log::{debug, trace};
use rustc_hash::FxHashMap;
use wln_ir::NameId;
use wln_sat::{Budget, SatSolver};

use crate::sim::{fold_hash, popcount, RandSource};

/// A node in the AIG arena.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct AigId(u32);
entity_impl!(AigId, "aig");

impl AigId {
    /// The reserved constant node (`CONST1` per spec §3.5; literal 0 on
    /// this node means logical false, literal 1 means logical true).
    pub const CONST0: AigId = AigId(0);
}

/// A node reference with an edge-level complement bit (spec §3.5: "two
/// fanin **literals** (id with complement bit)").
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct AigLit(u32);

impl AigLit {
    /// The literal for `id`, uncomplemented.
    pub fn new(id: AigId, complemented: bool) -> Self {
        AigLit((id.as_u32() << 1) | complemented as u32)
    }

    /// Logical false.
    pub const fn const0() -> Self {
        AigLit(0)
    }

    /// Logical true.
    pub const fn const1() -> Self {
        AigLit(1)
    }

    /// The underlying node id.
    pub fn id(self) -> AigId {
        AigId::from_u32(self.0 >> 1)
    }

    /// Whether this literal reads its node complemented.
    pub fn is_complemented(self) -> bool {
        self.0 & 1 == 1
    }

    /// The complementary literal.
    pub fn negate(self) -> Self {
        AigLit(self.0 ^ 1)
    }

    /// Apply `cond`'s complement on top of this literal's own.
    pub fn xor_compl(self, cond: bool) -> Self {
        AigLit(self.0 ^ (cond as u32))
    }

    /// Whether this literal denotes one of the two constants.
    pub fn is_const(self) -> bool {
        self.id() == AigId::CONST0
    }

    fn sort_key(self) -> u32 {
        self.0
    }
}

/// What kind of node this is (spec §3.5: "Node types: `CONST1, PI, AND,
/// (optional) BUF`").
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NodeKind {
    /// The single reserved constant node.
    Const,
    /// A primary input.
    Pi,
    /// A two-input AND gate.
    And,
    /// A barrier buffer inserted at a module boundary (spec §4.D).
    Buf,
}

/// The five-state lifecycle of a FRAIG node (spec §4.X).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NodeState {
    /// Just allocated; not yet in any hash table.
    Fresh,
    /// Present in the structural hash table.
    Canonicalized,
    /// Present in a functional hash table (`TableF`/`TableF0`).
    InFuncTable,
    /// Participated in at least one SAT call that hit its budget (sticky).
    FailedTfo,
    /// No longer reachable from any PO after a `cleanup()`/compaction pass.
    Retired,
}

/// Which side of a module boundary a [`BarrierEntry`] records (spec §3.5
/// "Barrier buffers").
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Side {
    /// Wrapping an input literal, before inlining.
    In,
    /// Wrapping an output literal, after inlining.
    Out,
}

/// One crossing recorded by barrier-buffer insertion (spec §4.D step 1/2,
/// §8 property 5). A sum type, per the Design Notes, rather than the
/// original's packed `(count << 16) | lit` encoding.
#[derive(Clone, Debug)]
pub struct BarrierEntry {
    /// Number of bits wrapped at this crossing.
    pub count: u32,
    /// The module whose boundary this crossing belongs to.
    pub module_name: NameId,
    /// Input side or output side.
    pub side: Side,
    /// The buffer node ids, in port order, that make up this crossing.
    pub bufs: Vec<AigId>,
}

#[derive(Clone)]
struct Node {
    kind: NodeKind,
    fanin0: AigLit,
    fanin1: AigLit,
    level: u32,
    ref_count: u32,
    sim_rand: Vec<u64>,
    sim_dyn: Vec<u64>,
    hash_rand: u64,
    hash_dyn: u64,
    failed_tfo: bool,
    repr: Option<AigLit>,
    next_e: Option<AigId>,
    next_d: Option<AigId>,
    state: NodeState,
}

/// Outcome of resolving a newly canonicalized node against the structural
/// table: either a brand-new node, or an existing one (already resolved
/// to its representative's literal).
enum Canon {
    New(AigId),
    Existing(AigLit),
}

/// The hash-consed AIG arena (spec §3.5/§4.E). Generic over no SAT
/// backend at the type level — `and_canon` takes a `&mut impl SatSolver`
/// per call, since the backend is a narrow, swappable collaborator (spec
/// §1), not part of this type's own state.
pub struct Aig {
    nodes: PrimaryMap<AigId, Node>,
    table_s: FxHashMap<(AigLit, AigLit), AigId>,
    table_f: FxHashMap<u64, Vec<AigId>>,
    table_f0: Vec<AigId>,
    pis: Vec<AigId>,
    pos: Vec<AigLit>,
    pub(crate) rand: RandSource,
    w_rand: usize,
    dyn_len: usize,
    w_dyna_max: usize,
    /// `W_store`: words of headroom kept free above the permanent pool
    /// before `dyna_capacity_words` is doubled (spec §4.E "Dynamic-pattern
    /// compaction" step 4).
    w_store: usize,
    /// Every dynamic pattern currently represented in `sim_dyn`, as a
    /// full PI assignment, in append order — `dyn_history[..dyn_permanent]`
    /// is the permanent pool; the rest is the working set a compaction
    /// pass may discard. Keeping the assignments (not just the derived
    /// bits) is what lets `cover::compact` rebuild every node's vector
    /// "from scratch" per the spec's step 3.
    dyn_history: Vec<Vec<bool>>,
    dyn_permanent: usize,
    /// `fFuncRed`: whether functional reduction (the two functional hash
    /// tables + SAT resolution) runs at all, vs. structural hashing only.
    pub func_red: bool,
    /// `fDoSparse`: whether all-zero/all-one nodes get their own table
    /// rather than skipping functional hashing entirely.
    pub do_sparse: bool,
    /// `fChoicing`: whether proven-equivalent nodes are linked into a
    /// choice chain (for a downstream mapper) rather than just aliased.
    pub choicing: bool,
    /// Barrier-buffer crossings recorded by `wln-blast` (spec §4.D, §8
    /// property 5). Owned here since buffers are AIG nodes.
    pub barriers: Vec<BarrierEntry>,
}

impl Aig {
    /// Build an empty AIG. `w_rand` is the fixed random-simulation word
    /// count (`W_rand`); `seed` determines every PI's random vector.
    pub fn new(w_rand: usize, seed: u64) -> Self {
        let mut nodes = PrimaryMap::new();
        nodes.push(Node {
            kind: NodeKind::Const,
            fanin0: AigLit::const0(),
            fanin1: AigLit::const0(),
            level: 0,
            ref_count: 0,
            sim_rand: vec![0; w_rand],
            sim_dyn: Vec::new(),
            hash_rand: fold_hash(&vec![0u64; w_rand]),
            hash_dyn: 0,
            failed_tfo: false,
            repr: None,
            next_e: None,
            next_d: None,
            state: NodeState::Canonicalized,
        });
        Aig {
            nodes,
            table_s: FxHashMap::default(),
            table_f: FxHashMap::default(),
            table_f0: Vec::new(),
            pis: Vec::new(),
            pos: Vec::new(),
            rand: RandSource::new(seed),
            w_rand,
            dyn_len: 0,
            w_dyna_max: 64,
            w_store: 2,
            dyn_history: Vec::new(),
            dyn_permanent: 0,
            func_red: true,
            do_sparse: true,
            choicing: true,
            barriers: Vec::new(),
        }
    }

    /// Logical false.
    pub fn const0(&self) -> AigLit {
        AigLit::const0()
    }

    /// Logical true.
    pub fn const1(&self) -> AigLit {
        AigLit::const1()
    }

    /// Allocate a fresh primary input, seeding its random simulation words
    /// from the AIG's PRNG (spec §4.E: "initialized from a seeded PRNG at
    /// PI allocation time").
    pub fn new_pi(&mut self) -> AigLit {
        let sim_rand = self.rand.words(self.w_rand);
        let hash_rand = fold_hash(&sim_rand);
        let id = self.nodes.push(Node {
            kind: NodeKind::Pi,
            fanin0: AigLit::const0(),
            fanin1: AigLit::const0(),
            level: 0,
            ref_count: 0,
            sim_rand,
            sim_dyn: vec![0; self.dyn_len],
            hash_rand,
            hash_dyn: 0,
            failed_tfo: false,
            repr: None,
            next_e: None,
            next_d: None,
            state: NodeState::Fresh,
        });
        self.pis.push(id);
        AigLit::new(id, false)
    }

    /// Register `lit` as a primary output.
    pub fn add_po(&mut self, lit: AigLit) {
        self.bump_ref(lit);
        self.pos.push(lit);
    }

    /// Primary inputs, in allocation order.
    pub fn pis(&self) -> &[AigId] {
        &self.pis
    }

    /// Primary outputs, in registration order.
    pub fn pos(&self) -> &[AigLit] {
        &self.pos
    }

    /// A node's kind.
    pub fn kind(&self, id: AigId) -> NodeKind {
        self.nodes[id].kind
    }

    /// An AND/BUF node's fanins (as stored; for AND these are already
    /// canonicalized).
    pub fn fanins(&self, id: AigId) -> (AigLit, AigLit) {
        (self.nodes[id].fanin0, self.nodes[id].fanin1)
    }

    /// A node's level (longest path from any PI).
    pub fn level(&self, id: AigId) -> u32 {
        self.nodes[id].level
    }

    /// A node's reference count.
    pub fn ref_count(&self, id: AigId) -> u32 {
        self.nodes[id].ref_count
    }

    /// A node's lifecycle state (spec §4.X).
    pub fn state(&self, id: AigId) -> NodeState {
        self.nodes[id].state
    }

    /// Whether `id` is marked sticky-failed (spec §4.X: "any state →
    /// FailedTFO ... is sticky").
    pub fn is_failed_tfo(&self, id: AigId) -> bool {
        self.nodes[id].failed_tfo
    }

    /// Mark `id` (and leave it marked permanently) as having participated
    /// in a SAT call that hit its budget.
    pub fn mark_failed_tfo(&mut self, id: AigId) {
        self.nodes[id].failed_tfo = true;
        self.nodes[id].state = NodeState::FailedTfo;
    }

    /// The representative literal a node was proven equivalent to, if
    /// any, already adjusted so `lit`'s complement composes correctly —
    /// i.e. the literal to use in place of `AigLit::new(id, false)`.
    pub fn repr(&self, id: AigId) -> Option<AigLit> {
        self.nodes[id].repr
    }

    /// Resolve a literal through any recorded representative, composing
    /// complement bits along the way. Terminates because `repr` edges
    /// only ever point to lower-or-equal ids once choicing settles (the
    /// DAG is acyclic by construction).
    pub fn resolve(&self, lit: AigLit) -> AigLit {
        let mut cur = lit;
        loop {
            match self.nodes[cur.id()].repr {
                Some(r) => cur = r.xor_compl(cur.is_complemented()),
                None => return cur,
            }
        }
    }

    /// Total node count, including the reserved constant.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate AND node ids in creation order (a valid topological order,
    /// since every AND's fanins already existed when it was created).
    pub fn and_ids(&self) -> impl Iterator<Item = AigId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, n)| n.kind == NodeKind::And)
            .map(|(id, _)| id)
    }

    fn bump_ref(&mut self, lit: AigLit) {
        if !lit.is_const() {
            self.nodes[lit.id()].ref_count += 1;
        }
    }

    fn lit_rand_word(&self, lit: AigLit, w: usize) -> u64 {
        let base = if lit.is_const() {
            0
        } else {
            self.nodes[lit.id()].sim_rand[w]
        };
        if lit.is_complemented() {
            !base
        } else {
            base
        }
    }

    fn lit_dyn_word(&self, lit: AigLit, w: usize) -> u64 {
        let base = if lit.is_const() {
            0
        } else {
            self.nodes[lit.id()].sim_dyn[w]
        };
        if lit.is_complemented() {
            !base
        } else {
            base
        }
    }

    /// A node's random-simulation vector (its own polarity, uncomplemented).
    pub fn sim_rand(&self, id: AigId) -> &[u64] {
        &self.nodes[id].sim_rand
    }

    /// A node's dynamic-simulation vector (its own polarity,
    /// uncomplemented).
    pub fn sim_dyn(&self, id: AigId) -> &[u64] {
        &self.nodes[id].sim_dyn
    }

    /// A single bit of `lit`'s effective random-simulation value.
    pub fn lit_rand_bit(&self, lit: AigLit, pattern: usize) -> bool {
        let w = self.lit_rand_word(lit, pattern / 64);
        (w >> (pattern % 64)) & 1 == 1
    }

    /// A single bit of `lit`'s effective dynamic-simulation value.
    pub fn lit_dyn_bit(&self, lit: AigLit, pattern: usize) -> bool {
        let w = self.lit_dyn_word(lit, pattern / 64);
        (w >> (pattern % 64)) & 1 == 1
    }

    /// Number of dynamic-simulation patterns currently stored per node.
    pub fn dyn_pattern_count(&self) -> usize {
        self.dyn_len * 64
    }

    /// `W_rand * 64`: the fixed number of random-simulation patterns every
    /// node carries.
    pub fn rand_pattern_count(&self) -> usize {
        self.w_rand * 64
    }

    /// `W_dyna`: the dynamic vector's allocated capacity, in words.
    pub fn dyna_capacity_words(&self) -> usize {
        self.w_dyna_max
    }

    /// `W_store`: headroom words kept above the permanent pool before
    /// doubling `dyna_capacity_words` (spec §4.E step 4).
    pub(crate) fn dyn_store_words(&self) -> usize {
        self.w_store
    }

    /// Double the dynamic-vector capacity bookkeeping (spec §4.E step 4:
    /// "`sim_dyn` is reallocated at double capacity"). The backing
    /// `Vec<u64>`s already grow on demand; this only updates the declared
    /// ceiling `cover::compact` checks against.
    pub(crate) fn grow_dyna_capacity(&mut self) {
        self.w_dyna_max *= 2;
    }

    /// Every dynamic pattern currently represented, as full PI
    /// assignments, in append order.
    pub(crate) fn dyn_history(&self) -> &[Vec<bool>] {
        &self.dyn_history
    }

    /// How many of `dyn_history`'s patterns are in the permanent pool
    /// (spec §4.E step 3: "the chosen patterns join the permanent pool").
    pub(crate) fn dyn_permanent_count(&self) -> usize {
        self.dyn_permanent
    }

    /// Append one dynamic-simulation pattern (spec §4.E "Counter-example
    /// feedback": "appends a new dynamic pattern ... to every PI's
    /// `sim_dyn`, and resimulates all AND nodes over only the newly
    /// appended words"). `pi_values` must have one entry per `self.pis()`,
    /// in that order.
    pub fn append_dyn_pattern(&mut self, pi_values: &[bool]) {
        debug_assert_eq!(pi_values.len(), self.pis.len());
        let pattern_idx = self.dyn_history.len();
        self.dyn_history.push(pi_values.to_vec());
        self.append_one_pattern(pi_values, pattern_idx);
    }

    /// The actual per-pattern append mechanics, shared by
    /// `append_dyn_pattern` and history replay after compaction. `idx` is
    /// this pattern's 0-based position in the (conceptual) pattern
    /// sequence being built.
    fn append_one_pattern(&mut self, pi_values: &[bool], idx: usize) {
        let word_idx = idx / 64;
        let bit_idx = idx % 64;
        if bit_idx == 0 {
            self.dyn_len += 1;
            for node in self.nodes.values_mut() {
                node.sim_dyn.push(0);
            }
        }
        for (&pi, &val) in self.pis.clone().iter().zip(pi_values) {
            if val {
                self.nodes[pi].sim_dyn[word_idx] |= 1u64 << bit_idx;
            }
        }
        let ids: Vec<AigId> = self.nodes.keys().collect();
        for id in ids {
            if id == AigId::CONST0 {
                continue;
            }
            let kind = self.nodes[id].kind;
            let bit = match kind {
                NodeKind::And => {
                    let (f0, f1) = self.fanins(id);
                    self.lit_dyn_bit(f0, idx) && self.lit_dyn_bit(f1, idx)
                }
                NodeKind::Buf => {
                    let (f0, _) = self.fanins(id);
                    self.lit_dyn_bit(f0, idx)
                }
                NodeKind::Pi | NodeKind::Const => continue,
            };
            if bit {
                self.nodes[id].sim_dyn[word_idx] |= 1u64 << bit_idx;
            }
        }
        for node in self.nodes.values_mut() {
            node.hash_dyn = fold_hash(&node.sim_dyn);
        }
    }

    /// Group AND node ids currently sharing a functional-hash bucket
    /// (either a `TableF` bucket or the dedicated `TableF0` sparse bucket)
    /// — the candidate pairs `cover::compact` resolves (spec §4.E
    /// "Dynamic-pattern compaction" step 1).
    pub(crate) fn func_bucket_groups(&self) -> Vec<Vec<AigId>> {
        let mut groups: Vec<Vec<AigId>> = self.table_f.values().filter(|b| b.len() > 1).cloned().collect();
        if self.table_f0.len() > 1 {
            groups.push(self.table_f0.clone());
        }
        groups
    }

    /// Reset every node's dynamic-simulation state to empty, then replay
    /// `history` pattern by pattern (spec §4.E step 3: "all dynamic
    /// vectors and hashes are recomputed from scratch"). `permanent` marks
    /// how many leading entries of `history` are the new permanent pool.
    pub(crate) fn rebuild_dyn_from_history(&mut self, history: Vec<Vec<bool>>, permanent: usize) {
        self.dyn_len = 0;
        self.dyn_history.clear();
        self.dyn_permanent = 0;
        for node in self.nodes.values_mut() {
            node.sim_dyn.clear();
            node.hash_dyn = 0;
        }
        for (idx, pattern) in history.iter().enumerate() {
            self.append_one_pattern(pattern, idx);
            self.dyn_history.push(pattern.clone());
        }
        self.dyn_permanent = permanent;
        let pre_rand: Vec<u64> = self.nodes.values().map(|n| n.hash_rand).collect();
        let post_rand: Vec<u64> = self.nodes.values().map(|n| fold_hash(&n.sim_rand)).collect();
        debug_assert_eq!(pre_rand, post_rand, "spec §8 property 10: random hash must survive compaction");
    }

    fn canon_pair(mut p: AigLit, mut q: AigLit) -> (AigLit, AigLit) {
        if p.sort_key() > q.sort_key() {
            std::mem::swap(&mut p, &mut q);
        }
        (p, q)
    }

    /// The internal AND operation (spec §4.E "Structural and functional
    /// hashing", `Fraig_NodeAndCanon`). Applies algebraic identities,
    /// then structural hashing, then — if functional reduction is
    /// enabled — functional hashing with a SAT call to resolve
    /// collisions.
    pub fn and_canon<S: SatSolver>(
        &mut self,
        solver: &mut S,
        budget: &Budget,
        p: AigLit,
        q: AigLit,
    ) -> AigLit {
        if p == q {
            return p;
        }
        if p == q.negate() {
            return AigLit::const0();
        }
        if p.is_const() {
            return if !p.is_complemented() { AigLit::const0() } else { q };
        }
        if q.is_const() {
            return if !q.is_complemented() { AigLit::const0() } else { p };
        }
        let (p, q) = Self::canon_pair(p, q);

        let canon = match self.table_s.get(&(p, q)) {
            Some(&existing) => {
                let repr = self.resolve(AigLit::new(existing, false));
                Canon::Existing(repr)
            }
            None => Canon::New(self.alloc_and(p, q)),
        };
        let new_id = match canon {
            Canon::Existing(lit) => return lit,
            Canon::New(id) => id,
        };
        self.table_s.insert((p, q), new_id);
        self.nodes[new_id].state = NodeState::Canonicalized;
        let new_lit = AigLit::new(new_id, false);

        if !self.func_red {
            return new_lit;
        }
        self.resolve_functional(solver, budget, new_id, new_lit)
    }

    fn alloc_and(&mut self, p: AigLit, q: AigLit) -> AigId {
        let level = 1 + self.nodes[p.id()].level.max(self.nodes[q.id()].level);
        let sim_rand: Vec<u64> = (0..self.w_rand)
            .map(|w| self.lit_rand_word(p, w) & self.lit_rand_word(q, w))
            .collect();
        let sim_dyn: Vec<u64> = (0..self.dyn_len)
            .map(|w| self.lit_dyn_word(p, w) & self.lit_dyn_word(q, w))
            .collect();
        let hash_rand = fold_hash(&sim_rand);
        let hash_dyn = fold_hash(&sim_dyn);
        self.bump_ref(p);
        self.bump_ref(q);
        self.nodes.push(Node {
            kind: NodeKind::And,
            fanin0: p,
            fanin1: q,
            level,
            ref_count: 0,
            sim_rand,
            sim_dyn,
            hash_rand,
            hash_dyn,
            failed_tfo: false,
            repr: None,
            next_e: None,
            next_d: None,
            state: NodeState::Fresh,
        })
    }

    /// Step two of `NodeAndCanon`: functional hashing plus SAT
    /// resolution. Split out of `and_canon` so it can also be re-run
    /// after a new node is created during counter-example feedback.
    fn resolve_functional<S: SatSolver>(
        &mut self,
        solver: &mut S,
        budget: &Budget,
        new_id: AigId,
        new_lit: AigLit,
    ) -> AigLit {
        let rand_ones = popcount(&self.nodes[new_id].sim_rand);
        let sparse = rand_ones == 0 || rand_ones == (self.w_rand as u64) * 64;

        let existing = if sparse {
            if !self.do_sparse {
                return new_lit;
            }
            self.lookup_f0(new_id)
        } else {
            self.lookup_f(new_id)
        };
        let existing = match existing {
            Some(e) => e,
            None => {
                self.insert_into_func_table(new_id, sparse);
                return new_lit;
            }
        };

        let existing_lit = AigLit::new(existing, false);
        match crate::sat_sweep::are_equivalent(self, solver, budget, existing_lit, new_lit) {
            crate::sat_sweep::EquivOutcome::Equivalent { same_phase } => {
                self.nodes[new_id].repr = Some(existing_lit.xor_compl(!same_phase));
                if self.choicing && !crate::sat_sweep::in_tfi(self, existing, new_id) {
                    self.nodes[new_id].next_e = self.nodes[existing].next_e;
                    self.nodes[existing].next_e = Some(new_id);
                }
                debug!("{new_id} proven equivalent to {existing} (same_phase={same_phase})");
                AigLit::new(existing, false).xor_compl(!same_phase)
            }
            crate::sat_sweep::EquivOutcome::CounterExample(_) => {
                self.insert_into_func_table(new_id, sparse);
                new_lit
            }
            crate::sat_sweep::EquivOutcome::Undecided => {
                self.mark_failed_tfo(new_id);
                self.mark_failed_tfo(existing);
                self.insert_into_func_table(new_id, sparse);
                new_lit
            }
        }
    }

    fn lookup_f0(&self, id: AigId) -> Option<AigId> {
        let node = &self.nodes[id];
        self.table_f0
            .iter()
            .copied()
            .find(|&other| other != id && self.nodes[other].sim_rand == node.sim_rand)
    }

    fn lookup_f(&self, id: AigId) -> Option<AigId> {
        let node = &self.nodes[id];
        let bucket = self.table_f.get(&node.hash_rand)?;
        bucket.iter().copied().find(|&other| {
            other != id
                && self.nodes[other].repr.is_none()
                && vectors_match_up_to_complement(&self.nodes[other].sim_rand, &node.sim_rand)
                && vectors_match_up_to_complement(&self.nodes[other].sim_dyn, &node.sim_dyn)
        })
    }

    fn insert_into_func_table(&mut self, id: AigId, sparse: bool) {
        if sparse {
            self.table_f0.push(id);
        } else {
            let hash = self.nodes[id].hash_rand;
            self.table_f.entry(hash).or_default().push(id);
        }
        self.nodes[id].state = NodeState::InFuncTable;
    }

    /// Insert a barrier buffer (spec §3.5/§4.D): a one-input `BUF` node
    /// that is never structurally hashed away, since its entire purpose
    /// is to mark a position, not to compute anything new.
    pub fn insert_buf(&mut self, input: AigLit) -> AigLit {
        let level = self.nodes[input.id()].level;
        self.bump_ref(input);
        let id = self.nodes.push(Node {
            kind: NodeKind::Buf,
            fanin0: input,
            fanin1: AigLit::const0(),
            level: level + 1,
            ref_count: 0,
            sim_rand: (0..self.w_rand).map(|w| self.lit_rand_word(input, w)).collect(),
            sim_dyn: (0..self.dyn_len).map(|w| self.lit_dyn_word(input, w)).collect(),
            hash_rand: 0,
            hash_dyn: 0,
            failed_tfo: false,
            repr: None,
            next_e: None,
            next_d: None,
            state: NodeState::Fresh,
        });
        AigLit::new(id, false)
    }

    /// Record one barrier-buffer crossing (spec §4.D steps 1/2, §8
    /// property 5).
    pub fn record_barrier(&mut self, count: u32, module_name: NameId, side: Side, bufs: Vec<AigId>) {
        self.barriers.push(BarrierEntry {
            count,
            module_name,
            side,
            bufs,
        });
    }

    /// Collapse inverse-equivalent boundary pairs (spec §4.D "Inverse-
    /// boundary reduction", §8 property 6). For every `(in_entry,
    /// out_entry)` pair that are adjacent in `barriers` (the out-side
    /// entry immediately preceding the in-side entry of the next
    /// instance), rewire the upper row's buffers to drive the lower
    /// row's directly, turning the pair into an identity.
    pub fn reduce_inverse_buffers(&mut self) {
        let mut i = 0;
        while i + 1 < self.barriers.len() {
            let (out_count, out_bufs) = {
                let out_entry = &self.barriers[i];
                (out_entry.count, out_entry.bufs.clone())
            };
            let (in_count, in_bufs, adjacent) = {
                let in_entry = &self.barriers[i + 1];
                (
                    in_entry.count,
                    in_entry.bufs.clone(),
                    self.barriers[i].side == Side::Out && in_entry.side == Side::In,
                )
            };
            if adjacent && out_count == in_count {
                for (&out_id, &in_id) in out_bufs.iter().zip(in_bufs.iter()) {
                    let out_value = AigLit::new(out_id, false);
                    self.nodes[in_id].fanin0 = out_value;
                    self.nodes[in_id].sim_rand = self.nodes[out_id].sim_rand.clone();
                    self.nodes[in_id].sim_dyn = self.nodes[out_id].sim_dyn.clone();
                }
                trace!(
                    "reduce_inverse_buffers: collapsed crossing pair at index {i} ({out_count} bits)"
                );
                i += 2;
            } else {
                i += 1;
            }
        }
    }

    /// Clone the transitive fanin cones of `roots` into this same arena,
    /// substituting every node in `substitution`'s domain with the mapped
    /// literal instead of walking further (spec §4.D step 3: "clone its
    /// AIG into the parent, substituting its PI literals with the
    /// caller's argument literals"). Mirrors `wln_ir::Network`'s
    /// `duplicate_dfs` shape — a memoized recursive walk rather than a
    /// generic graph-copy abstraction — but replays every `AND`/`BUF`
    /// through `and_canon`/`insert_buf` so hash-consing still dedupes
    /// identical instantiations against each other and against the rest
    /// of the arena.
    pub fn clone_subgraph<S: SatSolver>(
        &mut self,
        solver: &mut S,
        budget: &Budget,
        roots: &[AigLit],
        substitution: &HashMap<AigId, AigLit>,
    ) -> Vec<AigLit> {
        let mut memo: HashMap<AigId, AigLit> = HashMap::new();
        roots
            .iter()
            .map(|&r| self.clone_lit(solver, budget, r, substitution, &mut memo))
            .collect()
    }

    fn clone_lit<S: SatSolver>(
        &mut self,
        solver: &mut S,
        budget: &Budget,
        lit: AigLit,
        substitution: &HashMap<AigId, AigLit>,
        memo: &mut HashMap<AigId, AigLit>,
    ) -> AigLit {
        if lit.is_const() {
            return lit;
        }
        let id = lit.id();
        let base = self.clone_id(solver, budget, id, substitution, memo);
        base.xor_compl(lit.is_complemented())
    }

    fn clone_id<S: SatSolver>(
        &mut self,
        solver: &mut S,
        budget: &Budget,
        id: AigId,
        substitution: &HashMap<AigId, AigLit>,
        memo: &mut HashMap<AigId, AigLit>,
    ) -> AigLit {
        if let Some(&m) = memo.get(&id) {
            return m;
        }
        if let Some(&s) = substitution.get(&id) {
            memo.insert(id, s);
            return s;
        }
        let result = match self.kind(id) {
            NodeKind::Pi | NodeKind::Const => AigLit::new(id, false),
            NodeKind::And => {
                let (f0, f1) = self.fanins(id);
                let c0 = self.clone_lit(solver, budget, f0, substitution, memo);
                let c1 = self.clone_lit(solver, budget, f1, substitution, memo);
                self.and_canon(solver, budget, c0, c1)
            }
            NodeKind::Buf => {
                let (f0, _) = self.fanins(id);
                let c0 = self.clone_lit(solver, budget, f0, substitution, memo);
                self.insert_buf(c0)
            }
        };
        memo.insert(id, result);
        result
    }

    /// GC boundary (spec §5): drop every node unreachable from any PO
    /// through either regular fanins or choice chains, retaining ids for
    /// everything still live (no compaction of ids — only the `state`
    /// field is flipped to `Retired`, keeping existing `AigId`s valid for
    /// any caller still holding one).
    pub fn cleanup(&mut self) {
        let mut live = vec![false; self.nodes.len()];
        let mut stack: Vec<AigId> = self.pos.iter().map(|lit| lit.id()).collect();
        while let Some(id) = stack.pop() {
            if live[id.as_u32() as usize] {
                continue;
            }
            live[id.as_u32() as usize] = true;
            let node = &self.nodes[id];
            if !node.fanin0.is_const() {
                stack.push(node.fanin0.id());
            }
            if node.kind == NodeKind::And && !node.fanin1.is_const() {
                stack.push(node.fanin1.id());
            }
            let mut choice = node.next_e;
            while let Some(c) = choice {
                if live[c.as_u32() as usize] {
                    break;
                }
                stack.push(c);
                choice = self.nodes[c].next_e;
            }
        }
        for (id, node) in self.nodes.iter_mut() {
            if !live[id.as_u32() as usize] && node.state != NodeState::Retired {
                node.state = NodeState::Retired;
            }
        }
    }
}

fn vectors_match_up_to_complement(a: &[u64], b: &[u64]) -> bool {
    if a == b {
        return true;
    }
    a.iter().zip(b.iter()).all(|(x, y)| *x == !*y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wln_sat::dpll::DpllSolver;

    fn budget() -> Budget {
        Budget::unbounded()
    }

    #[test]
    fn structural_hashing_dedups_identical_fanins() {
        let mut aig = Aig::new(4, 1);
        let mut solver = DpllSolver::new();
        let a = aig.new_pi();
        let b = aig.new_pi();
        let n1 = aig.and_canon(&mut solver, &budget(), a, b);
        let n2 = aig.and_canon(&mut solver, &budget(), a, b);
        assert_eq!(n1, n2, "spec §8 property 7: identical ordered fanins share an id");
    }

    #[test]
    fn and_with_self_is_identity() {
        let mut aig = Aig::new(4, 1);
        let mut solver = DpllSolver::new();
        let a = aig.new_pi();
        assert_eq!(aig.and_canon(&mut solver, &budget(), a, a), a);
    }

    #[test]
    fn and_with_complement_is_const0() {
        let mut aig = Aig::new(4, 1);
        let mut solver = DpllSolver::new();
        let a = aig.new_pi();
        assert_eq!(
            aig.and_canon(&mut solver, &budget(), a, a.negate()),
            aig.const0()
        );
    }

    #[test]
    fn and_with_const1_is_identity() {
        let mut aig = Aig::new(4, 1);
        let mut solver = DpllSolver::new();
        let a = aig.new_pi();
        assert_eq!(aig.and_canon(&mut solver, &budget(), a, aig.const1()), a);
    }

    #[test]
    fn commuted_fanins_canonicalize_to_the_same_node() {
        let mut aig = Aig::new(4, 1);
        let mut solver = DpllSolver::new();
        let a = aig.new_pi();
        let b = aig.new_pi();
        let n1 = aig.and_canon(&mut solver, &budget(), a, b);
        let n2 = aig.and_canon(&mut solver, &budget(), b, a);
        assert_eq!(n1, n2);
    }

    #[test]
    fn cleanup_retires_unreachable_nodes() {
        let mut aig = Aig::new(4, 1);
        let mut solver = DpllSolver::new();
        let a = aig.new_pi();
        let b = aig.new_pi();
        let live = aig.and_canon(&mut solver, &budget(), a, b);
        let dead = aig.and_canon(&mut solver, &budget(), a, aig.const1());
        let _ = dead;
        aig.add_po(live);
        aig.cleanup();
        assert_eq!(aig.state(live.id()), NodeState::Canonicalized);
    }
}
