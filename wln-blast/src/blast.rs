//! The per-module bit-blasting driver (spec §4.D "Per-module algorithm"):
//! walks a module in its normalized data-flow order, dispatching each cell
//! to an operator expander or to a recursive sub-module instantiation, and
//! produces the module's flattened primary-input/output literal surface.

use std::collections::HashMap;

use wln_fraig::{Aig, AigId, AigLit, Side};
use wln_hier::{Cell, CellTarget, Lib, Module, ModuleId, ModuleItem, Signal, WireIo};
use wln_sat::{Budget, SatSolver};

use crate::error::{Error, Result};
use crate::expand::{self, BitOp, CmpOp, Ctx, DivKind, ShiftDir, ShiftKind};
use crate::ports::PortNames;
use crate::signal::{self, LitMap};

/// One module's blasted PI/PO surface inside a shared [`Aig`] arena (spec
/// §4.D step 4: "Connect each primary output to the literal stored at its
/// bit positions"). Flattened bit order matches the module's normalized
/// wire order (spec §4.C step 4: inputs ascending, then outputs ascending).
#[derive(Clone, Debug, Default)]
pub struct ModuleBlast {
    /// Every input bit's PI node, in wire-then-bit order.
    pub inputs: Vec<AigId>,
    /// Every output bit's literal, in wire-then-bit order.
    pub outputs: Vec<AigLit>,
}

/// Drives bit-blasting for one [`Lib`] session (spec §4.D "Contract":
/// "idempotent and memoized... blasted at most once per library session").
/// Each submodule is blasted once into its own template PIs/POs the first
/// time it is instantiated; every call site then clones that template's
/// cone, substituting the template's PIs with the caller's argument
/// literals (spec step 3: "recursively blast the sub-module if not already
/// blasted; clone its AIG into the parent").
pub struct BlastSession {
    ports: PortNames,
    memo: HashMap<ModuleId, ModuleBlast>,
}

impl BlastSession {
    /// Start a fresh session over `lib`, interning the fixed operator port
    /// names it will need.
    pub fn new(lib: &mut Lib) -> Self {
        BlastSession {
            ports: PortNames::new(lib),
            memo: HashMap::new(),
        }
    }

    /// Bit-blast `mid`, returning its memoized PI/PO surface. Safe to call
    /// repeatedly for the same module within one session: subsequent calls
    /// return the cached template without re-walking the module.
    pub fn blast<S: SatSolver>(
        &mut self,
        lib: &mut Lib,
        aig: &mut Aig,
        solver: &mut S,
        budget: &Budget,
        mid: ModuleId,
    ) -> Result<ModuleBlast> {
        if let Some(cached) = self.memo.get(&mid) {
            return Ok(cached.clone());
        }
        let result = self.blast_module(lib, aig, solver, budget, mid)?;
        self.memo.insert(mid, result.clone());
        Ok(result)
    }

    fn blast_module<S: SatSolver>(
        &mut self,
        lib: &mut Lib,
        aig: &mut Aig,
        solver: &mut S,
        budget: &Budget,
        mid: ModuleId,
    ) -> Result<ModuleBlast> {
        let module = lib.module(mid).clone();
        log::debug!(
            "blasting module {:?} ({} wires, {} cells)",
            module.name(),
            module.wires().len(),
            module.cells().len()
        );
        let mut lits = signal::init_lit_map(&module);
        let mut inputs = Vec::new();

        // Step 2: allocate a fresh PI for every primary-input bit.
        for &wid in module.wires() {
            if matches!(module.wire(wid).io, WireIo::Input(_)) {
                let width = module.wire(wid).width as usize;
                let slot = lits.get_mut(&wid).expect("wire registered in init_lit_map");
                for bit in slot.iter_mut().take(width) {
                    let pi = aig.new_pi();
                    inputs.push(pi.id());
                    *bit = Some(pi);
                }
            }
        }

        // Step 3: walk the module in declaration (data-flow) order.
        for item in module.items.clone() {
            match item {
                ModuleItem::Wire(_) => {}
                ModuleItem::Connect(idx) => {
                    let (lhs, rhs) = module.connects[idx];
                    let bits = signal::gather(lib, &module, &lits, aig, rhs);
                    signal::scatter(lib, &module, &mut lits, lhs, &bits);
                }
                ModuleItem::Cell(cid) => {
                    let cell = module.cell(cid).clone();
                    self.blast_cell(lib, aig, solver, budget, &module, &mut lits, &cell)?;
                }
            }
        }

        // Step 4: connect every primary output to its literal vector.
        let mut outputs = Vec::new();
        for &wid in module.wires() {
            if matches!(module.wire(wid).io, WireIo::Output(_)) {
                let bits = signal::gather(lib, &module, &lits, aig, Signal::Wire(wid));
                for lit in &bits {
                    aig.add_po(*lit);
                }
                outputs.extend(bits);
            }
        }

        Ok(ModuleBlast { inputs, outputs })
    }

    fn blast_cell<S: SatSolver>(
        &mut self,
        lib: &mut Lib,
        aig: &mut Aig,
        solver: &mut S,
        budget: &Budget,
        module: &Module,
        lits: &mut LitMap,
        cell: &Cell,
    ) -> Result<()> {
        match cell.target {
            CellTarget::Operator(ty) => self.blast_operator(lib, aig, solver, budget, module, lits, cell, ty),
            CellTarget::Module(sub) => self.blast_instance(lib, aig, solver, budget, module, lits, cell, sub),
            CellTarget::Unresolved(name) => {
                let text = lib.names_ro().get_str(name).to_string();
                Err(Error::UnsupportedOperator(text))
            }
        }
    }

    /// Recursively blast (or fetch the memoized template for) `sub`, clone
    /// its cone into the caller's arena with the argument literals
    /// substituted in, and scatter the results into the caller's wires
    /// (spec §4.D step 3). Inserts barrier buffers at both sides of the
    /// call when `sub`, or this specific instantiation, is marked a
    /// boundary (spec §4.D "Barrier-buffer insertion").
    fn blast_instance<S: SatSolver>(
        &mut self,
        lib: &mut Lib,
        aig: &mut Aig,
        solver: &mut S,
        budget: &Budget,
        caller: &Module,
        lits: &mut LitMap,
        cell: &Cell,
        sub: ModuleId,
    ) -> Result<()> {
        let sub_module = lib.module(sub).clone();
        let is_boundary = sub_module.is_boundary || cell.mark.boundary;

        // Gather the caller's argument bits, one flattened vector per
        // input wire of `sub`, in `sub`'s normalized wire order.
        let mut arg_bits: Vec<AigLit> = Vec::new();
        let module_name = sub_module.name();
        for &wid in sub_module.wires() {
            let wire = sub_module.wire(wid);
            if !matches!(wire.io, WireIo::Input(_)) {
                continue;
            }
            let bits = match cell.connection(wire.name) {
                Some(sig) => signal::gather(lib, caller, lits, aig, sig),
                None => vec![aig.const0(); wire.width as usize],
            };
            arg_bits.extend(bits);
        }

        let in_bufs: Vec<AigId> = if is_boundary {
            log::trace!("inserting {} input barrier buffers for {:?}", arg_bits.len(), module_name);
            let bufs: Vec<AigId> = arg_bits.iter().map(|&lit| aig.insert_buf(lit).id()).collect();
            aig.record_barrier(bufs.len() as u32, module_name, Side::In, bufs.clone());
            arg_bits = bufs.iter().map(|&id| AigLit::new(id, false)).collect();
            bufs
        } else {
            Vec::new()
        };
        let _ = in_bufs;

        let template = self.blast(lib, aig, solver, budget, sub)?;
        if template.inputs.len() != arg_bits.len() {
            return Err(Error::WidthMismatch {
                expected: template.inputs.len() as u32,
                actual: arg_bits.len() as u32,
            });
        }
        let substitution: HashMap<AigId, AigLit> = template
            .inputs
            .iter()
            .copied()
            .zip(arg_bits.iter().copied())
            .collect();
        let mut result_bits = aig.clone_subgraph(solver, budget, &template.outputs, &substitution);

        if is_boundary {
            let bufs: Vec<AigId> = result_bits.iter().map(|&lit| aig.insert_buf(lit).id()).collect();
            aig.record_barrier(bufs.len() as u32, module_name, Side::Out, bufs.clone());
            result_bits = bufs.iter().map(|&id| AigLit::new(id, false)).collect();
        }

        // Scatter the results back into the caller's wires, one output
        // wire of `sub` at a time.
        let mut offset = 0usize;
        for &wid in sub_module.wires() {
            let wire = sub_module.wire(wid);
            if !matches!(wire.io, WireIo::Output(_)) {
                continue;
            }
            let width = wire.width as usize;
            if let Some(sig) = cell.connection(wire.name) {
                signal::scatter(lib, caller, lits, sig, &result_bits[offset..offset + width]);
            }
            offset += width;
        }
        Ok(())
    }

    fn blast_operator<S: SatSolver>(
        &mut self,
        lib: &mut Lib,
        aig: &mut Aig,
        solver: &mut S,
        budget: &Budget,
        module: &Module,
        lits: &mut LitMap,
        cell: &Cell,
        ty: wln_ir::ObjectType,
    ) -> Result<()> {
        use wln_ir::ObjectType::*;

        let p = &self.ports;
        let conn = |lib: &Lib, module: &Module, lits: &LitMap, aig: &Aig, port| -> Vec<AigLit> {
            match cell.connection(port) {
                Some(sig) => signal::gather(lib, module, lits, aig, sig),
                None => Vec::new(),
            }
        };
        let y_sig = cell
            .connection(p.y)
            .ok_or_else(|| Error::NotFound("operator cell missing Y output".into()))?;
        let out_width = signal::signal_width(lib, module, lits, y_sig);

        let bool_param = |lib: &Lib, key| -> bool {
            cell.param(key)
                .map(|v| lib.names_ro().get_str(v) == "1")
                .unwrap_or(false)
        };
        let a_signed = bool_param(lib, p.a_signed);
        let b_signed = bool_param(lib, p.b_signed);
        let booth = bool_param(lib, p.booth);
        let non_rest = bool_param(lib, p.non_rest);

        // `DFFRSE` never runs through the gate expanders below: its output
        // bits become fresh PIs (the latch boundary for combinational
        // equivalence checking) rather than a function of its inputs, and
        // its D input is left evaluated but unconnected to any PO — both
        // match how the rest of this crate treats latches as PI/PO pairs
        // at the word-level-to-gate-level boundary rather than threading a
        // clock through the AIG.
        if let DFFRSE = ty {
            let arst_connected = cell.connection(p.arst).is_some();
            let is_async = bool_param(lib, p.r#async) || arst_connected;
            if is_async {
                return Err(Error::UnsupportedFeature("asynchronous reset".into()));
            }
            let q_sig = cell
                .connection(p.q)
                .ok_or_else(|| Error::NotFound("DFFRSE cell missing Q output".into()))?;
            let width = signal::signal_width(lib, module, lits, q_sig);
            let result: Vec<AigLit> = (0..width).map(|_| aig.new_pi()).collect();
            signal::scatter(lib, module, lits, y_sig, &result);
            return Ok(());
        }

        // Gather every operand this cell's operator might need up front,
        // while `aig` is still a plain `&mut Aig` — `Ctx` below takes it
        // by value, so nothing past this point may reach for `aig`
        // directly again.
        let a = conn(lib, module, lits, aig, p.a);
        let b = conn(lib, module, lits, aig, p.b);
        let s = conn(lib, module, lits, aig, p.s);
        let ci = conn(lib, module, lits, aig, p.ci);
        let nmux_data: Vec<Vec<AigLit>> = if matches!(ty, NMUX) {
            let count = 1usize << s.len().min(6);
            (0..count).map(|i| conn(lib, module, lits, aig, p.data_port(i))).collect()
        } else {
            Vec::new()
        };
        let pmux_cases: Vec<Vec<AigLit>> = if matches!(ty, PMUX) {
            (0..s.len()).map(|i| conn(lib, module, lits, aig, p.data_port(i))).collect()
        } else {
            Vec::new()
        };

        let mut ctx = Ctx { aig, solver, budget };

        let result: Vec<AigLit> = match ty {
            BUF => a.clone(),
            INV => a.iter().map(|l| l.negate()).collect(),
            AND => expand::bitwise(&mut ctx, BitOp::And, &a, &b, a_signed, b_signed, out_width),
            OR => expand::bitwise(&mut ctx, BitOp::Or, &a, &b, a_signed, b_signed, out_width),
            XOR => expand::bitwise(&mut ctx, BitOp::Xor, &a, &b, a_signed, b_signed, out_width),
            NAND => expand::bitwise(&mut ctx, BitOp::Nand, &a, &b, a_signed, b_signed, out_width),
            NOR => expand::bitwise(&mut ctx, BitOp::Nor, &a, &b, a_signed, b_signed, out_width),
            NXOR => expand::bitwise(&mut ctx, BitOp::Xnor, &a, &b, a_signed, b_signed, out_width),
            RED_AND => expand::reduce(&mut ctx, BitOp::And, &a, out_width),
            RED_OR => expand::reduce(&mut ctx, BitOp::Or, &a, out_width),
            RED_XOR => expand::reduce(&mut ctx, BitOp::Xor, &a, out_width),
            RED_NAND => expand::reduce(&mut ctx, BitOp::Nand, &a, out_width),
            RED_NOR => expand::reduce(&mut ctx, BitOp::Nor, &a, out_width),
            RED_NXOR => expand::reduce(&mut ctx, BitOp::Xnor, &a, out_width),
            LOGIC_NOT => expand::logic_not(&mut ctx, &a, out_width),
            LOGIC_AND => expand::logic_binary(&mut ctx, BitOp::And, &a, &b, out_width),
            LOGIC_OR => expand::logic_binary(&mut ctx, BitOp::Or, &a, &b, out_width),
            LOGIC_XOR => expand::logic_binary(&mut ctx, BitOp::Xor, &a, &b, out_width),
            LOGIC_IMPL => expand::logic_impl(&mut ctx, &a, &b, out_width),
            COMP_EQU => expand::compare(&mut ctx, CmpOp::Eq, &a, &b, a_signed, b_signed, out_width),
            COMP_NOTEQU => expand::compare(&mut ctx, CmpOp::Ne, &a, &b, a_signed, b_signed, out_width),
            COMP_LESS => expand::compare(&mut ctx, CmpOp::Lt, &a, &b, a_signed, b_signed, out_width),
            COMP_LESSEQU => expand::compare(&mut ctx, CmpOp::Le, &a, &b, a_signed, b_signed, out_width),
            COMP_MORE => expand::compare(&mut ctx, CmpOp::Gt, &a, &b, a_signed, b_signed, out_width),
            COMP_MOREEQU => expand::compare(&mut ctx, CmpOp::Ge, &a, &b, a_signed, b_signed, out_width),
            SHIFT_L => expand::shift(&mut ctx, ShiftDir::Left, ShiftKind::Logical, &a, a_signed, &b, out_width),
            SHIFT_R => expand::shift(&mut ctx, ShiftDir::Right, ShiftKind::Logical, &a, a_signed, &b, out_width),
            SHIFT_LA => expand::shift(&mut ctx, ShiftDir::Left, ShiftKind::Arithmetic, &a, a_signed, &b, out_width),
            SHIFT_RA => expand::shift(&mut ctx, ShiftDir::Right, ShiftKind::Arithmetic, &a, a_signed, &b, out_width),
            SHIFT_ROTL => expand::shift(&mut ctx, ShiftDir::Left, ShiftKind::Rotate, &a, a_signed, &b, out_width),
            SHIFT_ROTR => expand::shift(&mut ctx, ShiftDir::Right, ShiftKind::Rotate, &a, a_signed, &b, out_width),
            ADD => expand::add(&mut ctx, &a, &b, a_signed, b_signed, out_width),
            SUB => expand::sub(&mut ctx, &a, &b, a_signed, b_signed, out_width),
            ADDSUB => {
                let mode = s.first().copied().unwrap_or_else(|| ctx.const0());
                let cin = ci.first().copied().unwrap_or_else(|| ctx.const0());
                expand::addsub(&mut ctx, &a, &b, mode, cin, a_signed, b_signed, out_width)
            }
            MUL => expand::mul(&mut ctx, &a, &b, a_signed, b_signed, out_width, booth),
            DIV => {
                let _ = non_rest;
                expand::divide(&mut ctx, DivKind::Div, &a, &b, a_signed, b_signed, out_width)
            }
            MOD => expand::divide(&mut ctx, DivKind::Mod, &a, &b, a_signed, b_signed, out_width),
            REM => expand::divide(&mut ctx, DivKind::Rem, &a, &b, a_signed, b_signed, out_width),
            POW => expand::pow(&mut ctx, &a, &b, a_signed, out_width),
            SQRT => expand::sqrt(&mut ctx, &a, out_width),
            SQUARE => expand::square(&mut ctx, &a, a_signed, out_width),
            MIN => expand::negate(&mut ctx, &a, out_width),
            SIGNEXT => expand::signext(&a, out_width),
            ZEROPAD => expand::zeropad(&a, out_width),
            MUX => {
                let sel = s.first().copied().unwrap_or_else(|| ctx.const0());
                expand::mux2(&mut ctx, sel, &a, &b, out_width)
            }
            NMUX => expand::nmux(&mut ctx, &s, &nmux_data, out_width)?,
            PMUX => expand::pmux(&mut ctx, &s, &a, &pmux_cases, out_width),
            DECODER => expand::decoder(&mut ctx, &a, out_width as u32)?,
            TABLE | LUT => {
                let truth_name = cell.param(p.table).ok_or_else(|| {
                    Error::UnsupportedFeature(format!("{ty:?} cell missing TABLE parameter"))
                })?;
                let text = lib.names_ro().get_str(truth_name);
                let truth: Vec<bool> = text.chars().rev().map(|c| c == '1').collect();
                expand::table(&mut ctx, &a, &truth, out_width)
            }
            RAMR | RAMW => return Err(Error::UnsupportedOperator(format!("{ty:?}"))),
            DFFRSE => unreachable!("handled above before operand gathering"),
            NONE | CI | CO | FON | CONST | SLICE | CONCAT => {
                return Err(Error::UnsupportedOperator(format!("{ty:?}")))
            }
        };

        signal::scatter(lib, module, lits, y_sig, &result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wln_hier::lex::Lexer;
    use wln_sat::DpllSolver;

    fn ingest(src: &str) -> Lib {
        let mut lib = Lib::new();
        wln_hier::ingest(&mut lib, Lexer::new(src)).unwrap();
        lib.normalize().unwrap();
        lib
    }

    fn new_ctx() -> (Aig, DpllSolver, Budget) {
        (Aig::new(8, 1), DpllSolver::default(), Budget::unbounded())
    }

    #[test]
    fn blasts_a_two_bit_adder() {
        let mut lib = ingest(
            "\
module \\top
  wire width 2 input 1 \\a
  wire width 2 input 2 \\b
  wire width 3 output 1 \\s
  cell $add $1
    connect \\A \\a
    connect \\B \\b
    connect \\Y \\s
  end
end
",
        );
        let mid = lib.module_named(lib.names().intern_str("top")).unwrap();
        let (mut aig, mut solver, budget) = new_ctx();
        let mut session = BlastSession::new(&mut lib);
        let result = session.blast(&mut lib, &mut aig, &mut solver, &budget, mid).unwrap();
        assert_eq!(result.inputs.len(), 4);
        assert_eq!(result.outputs.len(), 3);
        assert_eq!(aig.pos().len(), 3);
    }

    #[test]
    fn blasting_is_memoized_across_calls() {
        let mut lib = ingest(
            "\
module \\top
  wire width 1 input 1 \\a
  wire width 1 output 1 \\y
  cell $not $1
    connect \\A \\a
    connect \\Y \\y
  end
end
",
        );
        let mid = lib.module_named(lib.names().intern_str("top")).unwrap();
        let (mut aig, mut solver, budget) = new_ctx();
        let mut session = BlastSession::new(&mut lib);
        let first = session.blast(&mut lib, &mut aig, &mut solver, &budget, mid).unwrap();
        let second = session.blast(&mut lib, &mut aig, &mut solver, &budget, mid).unwrap();
        assert_eq!(first.inputs, second.inputs);
        assert_eq!(first.outputs, second.outputs);
    }

    #[test]
    fn boundary_instantiation_inserts_barrier_buffers_both_sides() {
        let mut lib = ingest(
            "\
module \\inv
  wire width 1 input 1 \\a
  wire width 1 output 1 \\y
  cell $not $1
    connect \\A \\a
    connect \\Y \\y
  end
end
module \\top
  wire width 1 input 1 \\a
  wire width 1 output 1 \\y
  cell \\inv \\u0
    connect \\a \\a
    connect \\y \\y
  end
end
",
        );
        let inv = lib.module_named(lib.names().intern_str("inv")).unwrap();
        lib.module_mut(inv).is_boundary = true;
        let top = lib.module_named(lib.names().intern_str("top")).unwrap();
        let (mut aig, mut solver, budget) = new_ctx();
        let mut session = BlastSession::new(&mut lib);
        session.blast(&mut lib, &mut aig, &mut solver, &budget, top).unwrap();
        assert_eq!(aig.barriers.len(), 2);
        assert_eq!(aig.barriers[0].side, Side::In);
        assert_eq!(aig.barriers[1].side, Side::Out);
    }

    #[test]
    fn unresolved_cell_type_is_reported() {
        let mut lib = ingest(
            "\
module \\top
  wire width 1 input 1 \\a
  wire width 1 output 1 \\y
  cell $nonexistent_op $1
    connect \\A \\a
    connect \\Y \\y
  end
end
",
        );
        let mid = lib.module_named(lib.names().intern_str("top")).unwrap();
        let (mut aig, mut solver, budget) = new_ctx();
        let mut session = BlastSession::new(&mut lib);
        let err = session.blast(&mut lib, &mut aig, &mut solver, &budget, mid).unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperator(_)));
    }

    #[test]
    fn mismatched_instance_width_is_rejected() {
        let mut lib = ingest(
            "\
module \\sub
  wire width 2 input 1 \\a
  wire width 2 output 1 \\y
  cell $not $1
    connect \\A \\a
    connect \\Y \\y
  end
end
module \\top
  wire width 1 input 1 \\a
  wire width 2 output 1 \\y
  cell \\sub \\u0
    connect \\a \\a
    connect \\y \\y
  end
end
",
        );
        let mid = lib.module_named(lib.names().intern_str("top")).unwrap();
        let (mut aig, mut solver, budget) = new_ctx();
        let mut session = BlastSession::new(&mut lib);
        let err = session.blast(&mut lib, &mut aig, &mut solver, &budget, mid).unwrap_err();
        assert!(matches!(err, Error::WidthMismatch { .. }));
    }
}
