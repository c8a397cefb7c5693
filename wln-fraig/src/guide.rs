//! Guidance-driven hierarchical proof (spec §4.E "Guidance-driven
//! hierarchical proof", §6.6 "Guidance file").
//!
//! Parsing the textual task list and running `equal`/`inverse`/`property`
//! tasks over already-blasted module ports lives here; resolving a module
//! name to its blasted ports is left to the caller (a `resolve` closure)
//! so this crate never has to depend on `wln-blast` — `wln-blast` already
//! depends on `wln-fraig` to emit into the AIG arena, and a dependency the
//! other way would be a cycle.

use log::warn;
use wln_ir::NameId;
use wln_sat::{Budget, SatSolver};

use crate::aig::{Aig, AigId, AigLit, Side};
use crate::error::Error;
use crate::sat_sweep::{self, EquivOutcome};

/// The one verb the guidance file format supports (spec §6.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Prove,
}

/// The three task types (spec §4.E "Guidance-driven hierarchical proof").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Equal,
    Inverse,
    Property,
}

/// One parsed line of a guidance file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidanceTask {
    pub verb: Verb,
    pub kind: TaskKind,
    pub module_a: String,
    pub module_b: Option<String>,
    /// 1-based source line, for diagnostics.
    pub line: usize,
}

/// Parse a guidance file (spec §6.6): one task per line, `#`-prefixed
/// lines and blank lines ignored, each remaining line either
/// `prove <type> <module-a>` or `prove <type> <module-a> <module-b>`.
pub fn parse_guidance(text: &str) -> Result<Vec<GuidanceTask>, Error> {
    let mut tasks = Vec::new();
    for (i, raw_line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 || tokens.len() > 4 {
            return Err(Error::InvariantViolation(format!(
                "guidance line {line_no}: expected 3 or 4 tokens, got {}",
                tokens.len()
            )));
        }
        let verb = match tokens[0] {
            "prove" => Verb::Prove,
            other => {
                return Err(Error::InvariantViolation(format!(
                    "guidance line {line_no}: unknown verb {other:?}"
                )))
            }
        };
        let kind = match tokens[1] {
            "equal" => TaskKind::Equal,
            "inverse" => TaskKind::Inverse,
            "property" => TaskKind::Property,
            other => {
                return Err(Error::InvariantViolation(format!(
                    "guidance line {line_no}: unknown type {other:?}"
                )))
            }
        };
        tasks.push(GuidanceTask {
            verb,
            kind,
            module_a: tokens[2].to_string(),
            module_b: tokens.get(3).map(|s| s.to_string()),
            line: line_no,
        });
    }
    Ok(tasks)
}

/// Outcome of running one guidance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Equivalent,
    NotEquivalent,
    Undecided,
}

/// The PI/PO surface of one blasted module, in declaration order, inside
/// a shared [`Aig`] arena.
#[derive(Debug, Clone)]
pub struct ModulePorts {
    pub inputs: Vec<AigId>,
    pub outputs: Vec<AigLit>,
}

/// `equal` task (spec: "blast both modules independently... building a
/// miter and running SAT sweeping"). Strategy (ii) from the spec's two
/// listed strategies; strategy (i) ("collapsing into a single CNF and
/// solving") is subsumed here since `are_equivalent` already drives a SAT
/// call per output pair when simulation alone can't decide it.
pub fn prove_equal<S: SatSolver>(
    aig: &mut Aig,
    solver: &mut S,
    budget: &Budget,
    outs_a: &[AigLit],
    outs_b: &[AigLit],
) -> TaskOutcome {
    if outs_a.len() != outs_b.len() {
        return TaskOutcome::NotEquivalent;
    }
    for (&a, &b) in outs_a.iter().zip(outs_b.iter()) {
        match sat_sweep::are_equivalent(aig, solver, budget, a, b) {
            EquivOutcome::Equivalent { .. } => {}
            EquivOutcome::CounterExample(_) => return TaskOutcome::NotEquivalent,
            EquivOutcome::Undecided => return TaskOutcome::Undecided,
        }
    }
    TaskOutcome::Equivalent
}

/// `property` task: treat the module as a miter and try to prove every
/// output is constant `0`.
pub fn prove_property<S: SatSolver>(
    aig: &mut Aig,
    solver: &mut S,
    budget: &Budget,
    outputs: &[AigLit],
) -> TaskOutcome {
    let zero = aig.const0();
    for &out in outputs {
        match sat_sweep::are_equivalent(aig, solver, budget, out, zero) {
            EquivOutcome::Equivalent { .. } => {}
            EquivOutcome::CounterExample(_) => return TaskOutcome::NotEquivalent,
            EquivOutcome::Undecided => return TaskOutcome::Undecided,
        }
    }
    TaskOutcome::Equivalent
}

/// `inverse` task (spec: "locate each module's distinguished I/O group...
/// move those bits to the front... build an inverse miter... run SAT
/// sweep, then collapse inverse buffers"). The "distinguished I/O group"
/// is taken positionally here — `a`'s first `n` outputs are wired to
/// `b`'s first `n` inputs and vice versa, where `n` is the overlap size
/// in each direction — rather than re-deriving which bits "coincide" by
/// some other structural signature; the guidance file's module ordering
/// is assumed to already put the paired bits first.
pub fn prove_inverse<S: SatSolver>(
    aig: &mut Aig,
    solver: &mut S,
    budget: &Budget,
    a: &ModulePorts,
    b: &ModulePorts,
) -> TaskOutcome {
    let fwd_n = a.outputs.len().min(b.inputs.len());
    let bwd_n = b.outputs.len().min(a.inputs.len());
    if fwd_n == 0 && bwd_n == 0 {
        return TaskOutcome::Undecided;
    }

    let (fwd_out_bufs, fwd_in_bufs) =
        wire_crossing(aig, &a.outputs[..fwd_n], &b.inputs[..fwd_n], NameId::NONE);
    let (bwd_out_bufs, bwd_in_bufs) =
        wire_crossing(aig, &b.outputs[..bwd_n], &a.inputs[..bwd_n], NameId::NONE);

    aig.reduce_inverse_buffers();

    for (&out_id, &in_id) in fwd_out_bufs.iter().zip(fwd_in_bufs.iter()) {
        match check_collapsed(aig, solver, budget, out_id, in_id) {
            TaskOutcome::Equivalent => {}
            other => return other,
        }
    }
    for (&out_id, &in_id) in bwd_out_bufs.iter().zip(bwd_in_bufs.iter()) {
        match check_collapsed(aig, solver, budget, out_id, in_id) {
            TaskOutcome::Equivalent => {}
            other => return other,
        }
    }
    TaskOutcome::Equivalent
}

/// Insert one out-side/in-side barrier crossing (spec §4.D step 1/2) and
/// return the buffer ids on each side, in bit order.
fn wire_crossing(
    aig: &mut Aig,
    out_lits: &[AigLit],
    in_pis: &[AigId],
    module_name: NameId,
) -> (Vec<AigId>, Vec<AigId>) {
    let out_bufs: Vec<AigId> = out_lits.iter().map(|&lit| aig.insert_buf(lit).id()).collect();
    aig.record_barrier(out_bufs.len() as u32, module_name, Side::Out, out_bufs.clone());
    let in_bufs: Vec<AigId> = in_pis
        .iter()
        .map(|&pi| aig.insert_buf(AigLit::new(pi, false)).id())
        .collect();
    aig.record_barrier(in_bufs.len() as u32, module_name, Side::In, in_bufs.clone());
    (out_bufs, in_bufs)
}

fn check_collapsed<S: SatSolver>(
    aig: &mut Aig,
    solver: &mut S,
    budget: &Budget,
    out_id: AigId,
    in_id: AigId,
) -> TaskOutcome {
    match sat_sweep::are_equivalent(
        aig,
        solver,
        budget,
        AigLit::new(out_id, false),
        AigLit::new(in_id, false),
    ) {
        EquivOutcome::Equivalent { .. } => TaskOutcome::Equivalent,
        EquivOutcome::CounterExample(_) => TaskOutcome::NotEquivalent,
        EquivOutcome::Undecided => TaskOutcome::Undecided,
    }
}

/// Run every parsed task in order, resolving module names to blasted
/// ports through `resolve`. Per-task failures (missing module, wrong
/// argument count) are logged and skipped rather than aborting the rest
/// of the list (spec: "per-task failures are logged and the loop
/// continues with the next task").
pub fn run_guidance<S: SatSolver>(
    tasks: &[GuidanceTask],
    aig: &mut Aig,
    solver: &mut S,
    budget: &Budget,
    mut resolve: impl FnMut(&mut Aig, &str) -> Option<ModulePorts>,
) -> Vec<(GuidanceTask, TaskOutcome)> {
    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        let outcome = match task.kind {
            TaskKind::Equal => {
                let (Some(b_name), Some(a), ) = (&task.module_b, resolve(aig, &task.module_a)) else {
                    warn!("guide: 'equal' task at line {} missing module or second module", task.line);
                    continue;
                };
                let Some(b) = resolve(aig, b_name) else {
                    warn!("guide: module {b_name:?} not found at line {}", task.line);
                    continue;
                };
                prove_equal(aig, solver, budget, &a.outputs, &b.outputs)
            }
            TaskKind::Inverse => {
                let (Some(b_name), Some(a)) = (&task.module_b, resolve(aig, &task.module_a)) else {
                    warn!("guide: 'inverse' task at line {} missing module or second module", task.line);
                    continue;
                };
                let Some(b) = resolve(aig, b_name) else {
                    warn!("guide: module {b_name:?} not found at line {}", task.line);
                    continue;
                };
                prove_inverse(aig, solver, budget, &a, &b)
            }
            TaskKind::Property => {
                let Some(a) = resolve(aig, &task.module_a) else {
                    warn!("guide: module {:?} not found at line {}", task.module_a, task.line);
                    continue;
                };
                prove_property(aig, solver, budget, &a.outputs)
            }
        };
        results.push((task.clone(), outcome));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use wln_sat::dpll::DpllSolver;

    #[test]
    fn parses_three_and_four_token_lines() {
        let text = "# comment\nprove equal mod_a mod_b\nprove property mod_c\n\n";
        let tasks = parse_guidance(text).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].kind, TaskKind::Equal);
        assert_eq!(tasks[0].module_b.as_deref(), Some("mod_b"));
        assert_eq!(tasks[1].kind, TaskKind::Property);
        assert_eq!(tasks[1].module_b, None);
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(parse_guidance("prove bogus mod_a").is_err());
    }

    #[test]
    fn prove_equal_detects_identical_fanin_order_invariance() {
        let mut aig = Aig::new(4, 1);
        let mut solver = DpllSolver::new();
        let budget = Budget::unbounded();
        let a = aig.new_pi();
        let b = aig.new_pi();
        let n1 = aig.and_canon(&mut solver, &budget, a, b);
        let n2 = aig.and_canon(&mut solver, &budget, b, a);
        let outcome = prove_equal(&mut aig, &mut solver, &budget, &[n1], &[n2]);
        assert_eq!(outcome, TaskOutcome::Equivalent);
    }

    #[test]
    fn prove_equal_detects_mismatched_output_count() {
        let mut aig = Aig::new(4, 1);
        let mut solver = DpllSolver::new();
        let budget = Budget::unbounded();
        let a = aig.new_pi();
        let outcome = prove_equal(&mut aig, &mut solver, &budget, &[a], &[]);
        assert_eq!(outcome, TaskOutcome::NotEquivalent);
    }

    #[test]
    fn prove_property_confirms_constant_zero_output() {
        let mut aig = Aig::new(4, 1);
        let mut solver = DpllSolver::new();
        let budget = Budget::unbounded();
        let a = aig.new_pi();
        let not_a = aig.and_canon(&mut solver, &budget, a, a).negate();
        let contradiction = aig.and_canon(&mut solver, &budget, a, not_a);
        let outcome = prove_property(&mut aig, &mut solver, &budget, &[contradiction]);
        assert_eq!(outcome, TaskOutcome::Equivalent);
    }
}
