//! Dynamic-pattern compaction (spec §4.E "Dynamic-pattern compaction
//! (covering)"): when `sim_dyn` space runs low, greedily pick the smallest
//! set of dynamic patterns that still distinguishes every pair of nodes
//! currently sharing a functional-hash bucket, drop the rest, and rebuild
//! every node's dynamic vector from that surviving set.

use std::collections::HashSet;

use log::debug;

use crate::aig::{Aig, AigId, AigLit};

/// Run one compaction pass if the dynamic-vector capacity is exhausted
/// (spec §4.E step 4: trigger condition "when `sim_dyn` space runs out").
/// A no-op if there is still headroom.
pub fn compact_if_needed(aig: &mut Aig) {
    if aig.dyn_pattern_count() / 64 + 1 <= aig.dyna_capacity_words() - aig.dyn_store_words() {
        return;
    }
    compact(aig);
    if aig.dyn_history().len() / 64 + 1 > aig.dyna_capacity_words() - aig.dyn_store_words() {
        aig.grow_dyna_capacity();
        debug!("cover::compact: grew dyna capacity to {}", aig.dyna_capacity_words());
    }
}

/// Unconditionally run one compaction pass (spec §4.E steps 1-3).
pub fn compact(aig: &mut Aig) {
    let groups = aig.func_bucket_groups();
    let history = aig.dyn_history().to_vec();
    let permanent = aig.dyn_permanent_count();
    let candidate_lo = permanent;
    let candidate_hi = history.len();
    if candidate_hi <= candidate_lo {
        // Nothing new to compact away yet.
        return;
    }

    // Step 1/2: for every pair sharing a bucket, the set of *candidate*
    // (non-permanent) pattern indices that distinguish it.
    let mut pair_patterns: Vec<(AigId, AigId, Vec<usize>)> = Vec::new();
    for group in &groups {
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                let a = group[i];
                let b = group[j];
                let distinguishing = distinguishing_patterns(aig, a, b, candidate_lo, candidate_hi);
                if !distinguishing.is_empty() {
                    pair_patterns.push((a, b, distinguishing));
                }
            }
        }
    }

    // Step 3: greedy set cover over the candidate pattern range.
    let mut outstanding: HashSet<usize> = (0..pair_patterns.len()).collect();
    let mut chosen: HashSet<usize> = HashSet::new();
    while !outstanding.is_empty() {
        let mut best_pattern: Option<usize> = None;
        let mut best_count = 0usize;
        for pattern in candidate_lo..candidate_hi {
            if chosen.contains(&pattern) {
                continue;
            }
            let count = outstanding
                .iter()
                .filter(|&&pair_idx| pair_patterns[pair_idx].2.contains(&pattern))
                .count();
            if count > best_count {
                best_count = count;
                best_pattern = Some(pattern);
            }
        }
        match best_pattern {
            Some(p) if best_count > 0 => {
                chosen.insert(p);
                outstanding.retain(|&pair_idx| !pair_patterns[pair_idx].2.contains(&p));
            }
            _ => break,
        }
    }

    let mut chosen_sorted: Vec<usize> = chosen.into_iter().collect();
    chosen_sorted.sort_unstable();
    debug!(
        "cover::compact: {} pairs, {} candidates, {} chosen",
        pair_patterns.len(),
        candidate_hi - candidate_lo,
        chosen_sorted.len()
    );

    let mut new_history: Vec<Vec<bool>> = history[..permanent].to_vec();
    for idx in &chosen_sorted {
        new_history.push(history[*idx].clone());
    }
    let new_permanent = new_history.len();
    aig.rebuild_dyn_from_history(new_history, new_permanent);
}

/// Pattern indices in `[lo, hi)` at which `a` and `b`'s dynamic values
/// disagree. Only meaningful when the pair is not already known-unequal
/// on the permanent pool (callers only invoke this for pairs a real
/// structural/functional hash pass judged collision candidates).
fn distinguishing_patterns(aig: &Aig, a: AigId, b: AigId, lo: usize, hi: usize) -> Vec<usize> {
    let la = AigLit::new(a, false);
    let lb = AigLit::new(b, false);
    (lo..hi)
        .filter(|&idx| aig.lit_dyn_bit(la, idx) != aig.lit_dyn_bit(lb, idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wln_sat::{dpll::DpllSolver, Budget};

    #[test]
    fn compact_keeps_distinguishing_patterns_and_drops_the_rest() {
        let mut aig = Aig::new(4, 7);
        let mut solver = DpllSolver::new();
        let budget = Budget::unbounded();
        let a = aig.new_pi();
        let b = aig.new_pi();
        let n1 = aig.and_canon(&mut solver, &budget, a, b);
        let n2 = aig.and_canon(&mut solver, &budget, a, b);
        assert_eq!(n1, n2, "sanity: same node, nothing to distinguish");

        // Two PIs that happen to coincide on random simulation would be
        // forced through dynamic patterns in the full engine; here we just
        // exercise the mechanics directly: append patterns and compact.
        aig.append_dyn_pattern(&[true, false]);
        aig.append_dyn_pattern(&[false, true]);
        aig.append_dyn_pattern(&[true, true]);
        let before = aig.dyn_history().len();
        compact(&mut aig);
        assert!(aig.dyn_history().len() <= before);
    }
}
