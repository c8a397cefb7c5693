//! The SAT solver boundary (spec §1: "the underlying low-level SAT solver
//! ... whose API is consumed via a narrow interface"). `wln-fraig` only
//! ever talks to a SAT backend through the [`SatSolver`] trait in this
//! crate; [`dpll::DpllSolver`] is the reference backend used by tests and
//! as the default, in the same spirit as `cranelift-codegen` treating
//! `regalloc2`/a `TargetIsa` as an injected, narrowly-typed collaborator
//! rather than inlined logic (see `DESIGN.md`).

pub mod dpll;

pub use dpll::DpllSolver;

use std::time::Instant;

/// A 0-based Boolean variable handle, stable for the lifetime of the
/// solver instance that allocated it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Var(u32);

impl Var {
    /// Build a `Var` from its dense index. Only solver implementations
    /// construct these directly; callers get them from
    /// [`SatSolver::new_var`].
    pub fn from_index(index: u32) -> Self {
        Var(index)
    }

    /// The variable's dense index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A literal: a variable in either polarity. Encoded the way MiniSAT-style
/// solvers do (`var << 1 | sign`) so `negate` is a single bit flip, but
/// exposed only through these accessors — callers never see the bit
/// trick.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Lit(u32);

impl Lit {
    /// The positive literal for `v`.
    pub fn positive(v: Var) -> Self {
        Lit(v.0 << 1)
    }

    /// The negative literal for `v`.
    pub fn negative(v: Var) -> Self {
        Lit((v.0 << 1) | 1)
    }

    /// The literal's underlying variable.
    pub fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    /// `true` for a positive literal.
    pub fn is_positive(self) -> bool {
        self.0 & 1 == 0
    }

    /// The complementary literal.
    pub fn negate(self) -> Self {
        Lit(self.0 ^ 1)
    }

    /// Build a literal for `v`, positive iff `positive`.
    pub fn of(v: Var, positive: bool) -> Self {
        if positive {
            Lit::positive(v)
        } else {
            Lit::negative(v)
        }
    }
}

/// Bounds a single [`SatSolver::solve`] call (spec §5: "each long-running
/// call ... accepts a `backtrack_limit` and a `time_limit`"). Exceeding
/// either must return [`SatResult::Undecided`] rather than block
/// indefinitely.
#[derive(Clone, Copy, Debug)]
pub struct Budget {
    /// Maximum number of backtracks before giving up.
    pub backtracks: u64,
    /// Wall-clock deadline, if any.
    pub deadline: Option<Instant>,
}

impl Budget {
    /// No limit at all — only appropriate for small, test-scale queries.
    pub fn unbounded() -> Self {
        Budget {
            backtracks: u64::MAX,
            deadline: None,
        }
    }

    /// A limit on backtracks only.
    pub fn with_backtracks(backtracks: u64) -> Self {
        Budget {
            backtracks,
            deadline: None,
        }
    }

    fn expired(&self, spent_backtracks: u64) -> bool {
        if spent_backtracks > self.backtracks {
            return true;
        }
        matches!(self.deadline, Some(d) if Instant::now() >= d)
    }
}

/// Outcome of a bounded [`SatSolver::solve`] call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SatResult {
    /// Satisfiable; read the model via [`SatSolver::model_value`].
    Sat,
    /// Unsatisfiable under the given assumptions.
    Unsat,
    /// The backtrack limit or time limit was hit before a verdict.
    Undecided,
}

/// The narrow interface `wln-fraig` consumes a SAT solver through (spec
/// §1, §4.E "SAT equivalence query"). Any MiniSAT-style incremental
/// solver can implement this; [`dpll::DpllSolver`] is the crate's own
/// reference implementation.
pub trait SatSolver {
    /// Allocate a fresh variable.
    fn new_var(&mut self) -> Var;

    /// Add a clause (a disjunction of literals) to the permanent clause
    /// database.
    fn add_clause(&mut self, lits: &[Lit]);

    /// Solve under the given assumption literals (spec §4.E step 4: "run
    /// two SAT instances back-to-back with assumptions"), bounded by
    /// `budget`.
    fn solve(&mut self, assumptions: &[Lit], budget: &Budget) -> SatResult;

    /// The model value assigned to `v` after the most recent [`SatResult::Sat`]
    /// outcome. `None` if `v` was never assigned (e.g. not in the solved
    /// cone) or the last call did not return `Sat`.
    fn model_value(&self, v: Var) -> Option<bool>;

    /// Number of variables allocated so far.
    fn num_vars(&self) -> u32;
}
