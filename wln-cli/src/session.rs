//! The mutable state one CLI invocation threads through its commands: the
//! loaded library, the shared AIG arena once blasting has started, and the
//! per-library bit-blasting memo table (component D's `BlastSession`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use wln_blast::BlastSession;
use wln_fraig::Aig;
use wln_hier::{Lib, ModuleId};
use wln_sat::{Budget, DpllSolver};

/// Everything a command needs, carried across the lifetime of one `wln`
/// process invocation (spec §5: single-threaded, explicit `&mut Lib`/`&mut
/// Aig` contexts — this struct is simply where those contexts live between
/// dispatching one subcommand and the next).
pub struct Session {
    pub lib: Lib,
    pub aig: Option<Aig>,
    blast: Option<BlastSession>,
    pub solver: DpllSolver,
    pub budget: Budget,
    pub last_path: Option<PathBuf>,
}

impl Session {
    /// A session with an empty library and no AIG yet.
    pub fn new() -> Self {
        Session {
            lib: Lib::new(),
            aig: None,
            blast: None,
            solver: DpllSolver::new(),
            budget: Budget::unbounded(),
            last_path: None,
        }
    }

    /// The module currently treated as the design's top: the module marked
    /// `is_root`, or (absent an explicit mark) the last module in the
    /// library's current enumeration order. Normalization's module
    /// reordering places leaves first (spec §4.C step 3), so the last
    /// module in a normalized library's order is its root by construction;
    /// this is the fallback used when no `hierarchy`/`collapse -T` call has
    /// marked one explicitly.
    pub fn top_module(&self) -> Result<ModuleId> {
        if let Some((id, _)) = self.lib.modules().find(|(_, m)| m.is_root) {
            return Ok(id);
        }
        self.lib
            .modules()
            .last()
            .map(|(id, _)| id)
            .context("library has no modules loaded (run `read` first)")
    }

    /// Resolve a module by name, failing with a clear message if absent.
    pub fn module_by_name(&mut self, name: &str) -> Result<ModuleId> {
        let id = self.lib.names().intern_str(name);
        self.lib
            .module_named(id)
            .with_context(|| format!("no module named {name:?}"))
    }

    /// Ensure the shared AIG arena and its blast memo table exist, creating
    /// them on first use. `w_rand` picks the random-simulation word count
    /// (spec §4.E "Simulation model"); 4 words (256 patterns) matches the
    /// size used in this crate's own tests.
    pub fn ensure_aig(&mut self) -> &mut Aig {
        if self.aig.is_none() {
            self.aig = Some(Aig::new(4, 0x5eed));
        }
        self.aig.as_mut().expect("just initialized")
    }

    /// Ensure the per-library blast memo table exists.
    pub fn ensure_blast(&mut self) -> &mut BlastSession {
        if self.blast.is_none() {
            self.blast = Some(BlastSession::new(&mut self.lib));
        }
        self.blast.as_mut().expect("just initialized")
    }

    /// Blast `mid` (and, transitively, anything it instantiates), caching
    /// the result for reuse by later commands in the same invocation.
    pub fn blast_module(&mut self, mid: ModuleId) -> Result<wln_blast::ModuleBlast> {
        self.ensure_aig();
        self.ensure_blast();
        let Session {
            lib,
            aig,
            blast,
            solver,
            budget,
            ..
        } = self;
        let aig = aig.as_mut().expect("ensure_aig ran above");
        let blast = blast.as_mut().expect("ensure_blast ran above");
        blast
            .blast(lib, aig, solver, budget, mid)
            .with_context(|| format!("bit-blasting module {mid} failed"))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
