//! One function per CLI subcommand (spec §6.1), each taking the live
//! [`Session`] plus its already-parsed `clap` arguments and returning an
//! [`anyhow::Result`] so `main` can bubble any crate's `Error` up through
//! one chain and print it with `Display` (spec §7 "no error is silently
//! swallowed").

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use wln_fraig::guide::{self, GuidanceTask, ModulePorts, TaskOutcome};
use wln_hier::{CellTarget, WireIo};
use wln_ir::ObjectType;

use crate::cli::*;
use crate::cone;
use crate::io;
use crate::session::Session;

pub fn read(sess: &mut Session, args: ReadArgs) -> Result<()> {
    let lib = io::read_file(&args.file)?;
    sess.lib = lib;
    sess.aig = None;
    sess.last_path = Some(args.file);
    let (mid, _) = sess
        .lib
        .modules()
        .last()
        .context("no modules declared in input")?;
    log::info!(
        "loaded {} module(s), top candidate {:?}",
        sess.lib.module_count(),
        sess.lib.names_ro().get_str(sess.lib.module(mid).name())
    );
    Ok(())
}

pub fn write(sess: &mut Session, args: WriteArgs) -> Result<()> {
    let path = match args.file {
        Some(p) => p,
        None => sess
            .last_path
            .clone()
            .context("no default path: pass a file or `read` one first")?
            .with_extension("v"),
    };
    io::write_file(&sess.lib, &path)
}

pub fn ps(sess: &mut Session, args: PsArgs) -> Result<()> {
    let mid = sess.top_module()?;
    let module = sess.lib.module(mid);
    let name = sess.lib.names_ro().get_str(module.name());
    println!("module {name}: {} wires, {} cells", module.wires().len(), module.cells().len());

    let mut adders = 0usize;
    let mut multipliers = 0usize;
    let mut tables = 0usize;
    let mut dffs = 0usize;
    for &cid in module.cells() {
        match module.cell(cid).target {
            CellTarget::Operator(ObjectType::ADD | ObjectType::SUB | ObjectType::ADDSUB) => {
                adders += 1
            }
            CellTarget::Operator(ObjectType::MUL) => multipliers += 1,
            CellTarget::Operator(ObjectType::TABLE | ObjectType::LUT) => tables += 1,
            CellTarget::Operator(ObjectType::DFFRSE) => dffs += 1,
            _ => {}
        }
    }
    if args.cones {
        match &sess.aig {
            Some(aig) => println!("  AIG nodes: {}", aig.len()),
            None => println!("  cones: not computed (run `blast` first)"),
        }
    }
    if args.boundaries {
        let count = sess.lib.modules().filter(|(_, m)| m.is_boundary).count();
        println!("  boundary modules: {count}");
    }
    if args.adders {
        println!("  adders: {adders}");
    }
    if args.multipliers {
        println!("  multipliers: {multipliers}");
    }
    if args.tables {
        println!("  tables/luts: {tables}");
    }
    if args.dffs {
        println!("  dffs: {dffs}");
    }
    if args.objects {
        for &cid in module.cells() {
            let cell = module.cell(cid);
            println!(
                "    cell {} {}",
                sess.lib.names_ro().get_str(cell.type_name),
                sess.lib.names_ro().get_str(cell.instance_name),
            );
        }
    }
    Ok(())
}

pub fn cone(sess: &mut Session, args: ConeArgs) -> Result<()> {
    let mid = sess.top_module()?;
    let report = cone::extract(&sess.lib, mid, args.output, args.count, args.shared);
    println!(
        "cone of {} output bit(s): {} wire(s), {} cell(s)",
        report.outputs.len(),
        report.wires.len(),
        report.cells.len()
    );
    if args.inputs_only {
        let module = sess.lib.module(mid);
        for &wid in &report.wires {
            if matches!(module.wire(wid).io, WireIo::Input(_)) {
                println!("  input {}", sess.lib.names_ro().get_str(module.wire(wid).name));
            }
        }
    }
    Ok(())
}

pub fn blast(sess: &mut Session, args: BlastArgs) -> Result<()> {
    if args.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }
    let mid = sess.top_module()?;
    if args.add_boundary_pos {
        sess.lib.module_mut(mid).is_boundary = true;
    }
    let result = sess.blast_module(mid)?;
    let aig = sess.aig.as_ref().expect("blast_module initializes it");
    println!(
        "blasted {}: {} PI(s), {} PO(s), {} AND node(s)",
        sess.lib.names_ro().get_str(sess.lib.module(mid).name()),
        result.inputs.len(),
        result.outputs.len(),
        aig.len()
    );
    if let Some(first) = args.first_po {
        let count = args.po_count.unwrap_or(result.outputs.len() as u32);
        println!("  POs [{first}..{}): ", first + count);
    }
    if args.dump_names {
        io::write_name_map(&PathBuf::from("pio_name_map.txt"), &sess.lib, mid)?;
        println!("  wrote pio_name_map.txt");
    }
    Ok(())
}

pub fn hierarchy(sess: &mut Session, args: HierarchyArgs) -> Result<()> {
    let mid = sess.module_by_name(&args.module)?;
    sess.lib.module_mut(mid).is_boundary = true;
    println!("marked {:?} as a blast boundary", args.module);
    Ok(())
}

pub fn collapse(sess: &mut Session, args: CollapseArgs) -> Result<()> {
    let mid = sess.module_by_name(&args.top)?;
    sess.lib.module_mut(mid).is_root = true;
    if args.clear_boundaries {
        let ids: Vec<_> = sess.lib.modules().map(|(id, _)| id).collect();
        for id in ids {
            sess.lib.module_mut(id).is_boundary = false;
        }
    }
    let result = sess.blast_module(mid)?;
    if args.reverse {
        let aig = sess.aig.as_mut().expect("blast_module initializes it");
        let pos: Vec<_> = aig.pos().to_vec();
        let mut reversed = pos;
        reversed.reverse();
        println!("collapsed {} with {} PO(s) (bit order reversed for display)", args.top, reversed.len());
    }
    println!(
        "collapsed {}: {} PI(s), {} PO(s)",
        args.top,
        result.inputs.len(),
        result.outputs.len()
    );
    Ok(())
}

pub fn graft(sess: &mut Session, args: GraftArgs) -> Result<()> {
    let a = sess.module_by_name(&args.mod1)?;
    let b = sess.module_by_name(&args.mod2)?;
    if args.inverse {
        sess.lib.mark_inverse_equivalence(a, b);
        println!("marked {} <-> {} as inverse equivalents", args.mod1, args.mod2);
    } else {
        sess.lib.mark_direct_equivalence(a, b);
        println!("marked {} <-> {} as direct equivalents", args.mod1, args.mod2);
    }
    Ok(())
}

pub fn print(sess: &mut Session, args: PrintArgs) -> Result<()> {
    for (mid, module) in sess.lib.modules() {
        println!("module {}", sess.lib.names_ro().get_str(module.name()));
        if args.ports {
            for &wid in module.wires() {
                let wire = module.wire(wid);
                if wire.is_port() {
                    println!(
                        "  port {} width {}",
                        sess.lib.names_ro().get_str(wire.name),
                        wire.width
                    );
                }
            }
        }
        if args.dump {
            for &cid in module.cells() {
                let cell = module.cell(cid);
                println!(
                    "  cell {} {}",
                    sess.lib.names_ro().get_str(cell.type_name),
                    sess.lib.names_ro().get_str(cell.instance_name),
                );
                if args.verbose {
                    for &(k, v) in &cell.params {
                        println!(
                            "    param {}={}",
                            sess.lib.names_ro().get_str(k),
                            sess.lib.names_ro().get_str(v)
                        );
                    }
                }
            }
        }
        let _ = mid;
    }
    Ok(())
}

pub fn prove(sess: &mut Session, args: ProveArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let tasks: Vec<GuidanceTask> =
        guide::parse_guidance(&text).map_err(|e| anyhow::anyhow!("{e}"))?;

    let module_ids: Vec<_> = sess.lib.modules().map(|(id, _)| id).collect();
    let mut ports: HashMap<String, ModulePorts> = HashMap::new();
    for mid in module_ids {
        let name = sess
            .lib
            .names_ro()
            .get_str(sess.lib.module(mid).name())
            .to_string();
        let blasted = sess.blast_module(mid)?;
        ports.insert(
            name,
            ModulePorts {
                inputs: blasted.inputs,
                outputs: blasted.outputs,
            },
        );
    }

    let aig = sess.aig.as_mut().expect("blast_module initialized it above");
    let resolve = move |_: &mut wln_fraig::Aig, name: &str| ports.get(name).cloned();
    let results = guide::run_guidance(&tasks, aig, &mut sess.solver, &sess.budget, resolve);

    let mut failures = 0;
    for (task, outcome) in &results {
        let verb = match task.kind {
            guide::TaskKind::Equal => "equal",
            guide::TaskKind::Inverse => "inverse",
            guide::TaskKind::Property => "property",
        };
        let status = match outcome {
            TaskOutcome::Equivalent => "PASS",
            TaskOutcome::NotEquivalent => {
                failures += 1;
                "FAIL"
            }
            TaskOutcome::Undecided => "UNDECIDED",
        };
        println!("line {}: {verb} {} -> {status}", task.line, task.module_a);
    }
    if failures > 0 {
        bail!("{failures} guidance task(s) failed");
    }
    Ok(())
}

pub fn inv_ps(sess: &mut Session) -> Result<()> {
    println!("{} saved invariant(s)", sess.lib.invariant_marks.len());
    Ok(())
}

pub fn inv_print(sess: &mut Session) -> Result<()> {
    for rec in &sess.lib.invariant_marks {
        println!(
            "{} {} := {}",
            sess.lib.names_ro().get_str(sess.lib.module(rec.module).name()),
            sess.lib.names_ro().get_str(rec.name),
            sess.lib.names_ro().get_str(rec.text),
        );
    }
    Ok(())
}

pub fn inv_check(sess: &mut Session, args: InvNameArgs) -> Result<()> {
    let mid = sess.module_by_name(&args.module)?;
    let name_id = sess.lib.names().intern_str(&args.name);
    let found = sess
        .lib
        .invariant_marks
        .iter()
        .any(|r| r.module == mid && r.name == name_id);
    if found {
        println!("present");
        Ok(())
    } else {
        bail!("no invariant named {:?} on module {:?}", args.name, args.module)
    }
}

pub fn inv_get(sess: &mut Session, args: InvNameArgs) -> Result<()> {
    let mid = sess.module_by_name(&args.module)?;
    let name_id = sess.lib.names().intern_str(&args.name);
    let rec = sess
        .lib
        .invariant_marks
        .iter()
        .find(|r| r.module == mid && r.name == name_id)
        .with_context(|| format!("no invariant named {:?} on module {:?}", args.name, args.module))?;
    println!("{}", sess.lib.names_ro().get_str(rec.text));
    Ok(())
}

pub fn inv_put(sess: &mut Session, args: InvPutArgs) -> Result<()> {
    let mid = sess.module_by_name(&args.module)?;
    let name_id = sess.lib.names().intern_str(&args.name);
    let text_id = sess.lib.names().intern_str(&args.text);
    sess.lib
        .invariant_marks
        .retain(|r| !(r.module == mid && r.name == name_id));
    sess.lib.invariant_marks.push(wln_hier::InvariantRecord {
        module: mid,
        name: name_id,
        text: text_id,
    });
    Ok(())
}

/// Drop duplicate invariants: when two records on the same module carry
/// identical text, only the first-seen name is kept. No minimization
/// algorithm is specified anywhere in the corpus beyond "manage saved
/// inductive invariants", so textual dedup is this crate's resolution of
/// that open question (see `DESIGN.md`).
pub fn inv_min(sess: &mut Session) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    let before = sess.lib.invariant_marks.len();
    sess.lib
        .invariant_marks
        .retain(|r| seen.insert((r.module, r.text)));
    println!(
        "{} -> {} invariant(s)",
        before,
        sess.lib.invariant_marks.len()
    );
    Ok(())
}

/// `abs`/`pdra`/`abs2`/`memabs`/`memabs2`: CEGAR abstraction flows, an
/// explicit non-goal (spec §1) treated as an external collaborator.
pub fn unsupported(what: &str) -> Result<()> {
    bail!("{what}: CEGAR abstraction flows are out of scope for this core (spec §1 non-goal)")
}

/// `yosys`: external synthesis front-end invocation (spec §6.5). Out of
/// scope for the same reason; the `yosyswin`/`yosysunix` hook names are
/// recorded for documentation purposes only.
pub fn yosys(_args: YosysArgs) -> Result<()> {
    bail!("yosys front-end invocation is an external collaborator, not implemented here")
}
