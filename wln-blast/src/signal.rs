//! Resolving a [`wln_hier::Signal`] to/from a flat per-wire literal array
//! (spec §4.D step 1/2: "assign each wire a contiguous range... gather
//! the bits of B... bind `Lits` of A's bits").
//!
//! Bits are held LSB-first throughout this crate: index 0 is the least
//! significant bit, regardless of how the source wire declared its
//! `[msb:lsb]` range (range normalization already canonicalized that).

use std::collections::HashMap;

use wln_fraig::{Aig, AigLit};
use wln_hier::{Lib, Module, Signal, WireId};

/// Per-wire literal storage for one module's blast pass. An unset bit
/// (`None`) reads as logical false (spec §9 Open Question: "unconnected
/// fanin treated as identity").
pub type LitMap = HashMap<WireId, Vec<Option<AigLit>>>;

/// Allocate (but do not fill) every wire's literal vector, sized to its
/// declared width.
pub fn init_lit_map(module: &Module) -> LitMap {
    let mut map = HashMap::new();
    for &wid in module.wires() {
        let width = module.wire(wid).width as usize;
        map.insert(wid, vec![None; width]);
    }
    map
}

/// Parse a constant's canonical text (spec §6.4: `<width>'b<bits>`, bits
/// MSB-first, or a bare decimal for an untyped `(-1, value)` constant)
/// into LSB-first AIG literals.
pub fn const_bits(aig: &Aig, width: i32, text: &str) -> Vec<AigLit> {
    if let Some(tick) = text.find('\'') {
        let bits_part = &text[tick + 1..];
        let bits_str = bits_part.strip_prefix('b').unwrap_or(bits_part);
        let mut bits: Vec<AigLit> = bits_str
            .chars()
            .rev()
            .map(|c| if c == '1' { aig.const1() } else { aig.const0() })
            .collect();
        let declared = width.max(0) as usize;
        bits.resize(declared.max(bits.len()), aig.const0());
        bits
    } else {
        let value: i64 = text.parse().unwrap_or(0);
        let declared = if width < 0 { 64 } else { width as usize };
        (0..declared)
            .map(|i| {
                if (value >> i) & 1 == 1 {
                    aig.const1()
                } else {
                    aig.const0()
                }
            })
            .collect()
    }
}

/// Read `sig`'s current literal vector, LSB-first, width equal to the
/// signal's own declared width.
pub fn gather(lib: &Lib, module: &Module, lits: &LitMap, aig: &Aig, sig: Signal) -> Vec<AigLit> {
    match sig {
        Signal::Wire(wid) => lits[&wid]
            .iter()
            .map(|bit| bit.unwrap_or_else(|| aig.const0()))
            .collect(),
        Signal::Const(cid) => {
            let value = lib.consts_ro().get(cid);
            const_bits(aig, value.width, lib.names_ro().get_str(value.text))
        }
        Signal::Slice(sid) => {
            let desc = lib.slices_ro().get(sid);
            let wid = module
                .wire_named(desc.base_name)
                .expect("slice referenced an unknown wire after normalization");
            let (hi, lo) = if desc.msb >= desc.lsb {
                (desc.msb, desc.lsb)
            } else {
                (desc.lsb, desc.msb)
            };
            let wire_bits = &lits[&wid];
            (lo..=hi)
                .map(|i| wire_bits[i as usize].unwrap_or_else(|| aig.const0()))
                .collect()
        }
        Signal::Concat(cid) => {
            let children = lib.concats_ro().get(cid).to_vec();
            let mut result = Vec::new();
            for child in children.iter().rev() {
                result.extend(gather(lib, module, lits, aig, *child));
            }
            result
        }
    }
}

/// A signal's declared bit width, without materializing any literals.
pub fn signal_width(lib: &Lib, module: &Module, lits: &LitMap, sig: Signal) -> usize {
    match sig {
        Signal::Wire(wid) => lits[&wid].len(),
        Signal::Const(cid) => {
            let value = lib.consts_ro().get(cid);
            const_bits_width(value.width, lib.names_ro().get_str(value.text))
        }
        Signal::Slice(sid) => {
            let desc = lib.slices_ro().get(sid);
            (desc.msb - desc.lsb).unsigned_abs() as usize + 1
        }
        Signal::Concat(cid) => lib
            .concats_ro()
            .get(cid)
            .iter()
            .map(|&child| signal_width(lib, module, lits, child))
            .sum(),
    }
}

fn const_bits_width(width: i32, text: &str) -> usize {
    if width >= 0 {
        return width as usize;
    }
    if let Some(tick) = text.find('\'') {
        let bits_part = &text[tick + 1..];
        bits_part.strip_prefix('b').unwrap_or(bits_part).len()
    } else {
        64
    }
}

/// Bind `sig`'s bits to `bits` (spec step 3 "Connection `A <- B`": "bind
/// `Lits` of A's bits to them"). Silently truncates/pads when `bits` is
/// shorter or longer than `sig`'s own width, matching Verilog's implicit
/// truncation/zero-extension on assignment.
pub fn scatter(lib: &Lib, module: &Module, lits: &mut LitMap, sig: Signal, bits: &[AigLit]) {
    match sig {
        Signal::Wire(wid) => {
            let slot = lits.get_mut(&wid).expect("unknown wire in scatter");
            for (i, dst) in slot.iter_mut().enumerate() {
                *dst = bits.get(i).copied();
            }
        }
        Signal::Slice(sid) => {
            let desc = lib.slices_ro().get(sid);
            let wid = module
                .wire_named(desc.base_name)
                .expect("slice referenced an unknown wire after normalization");
            let (hi, lo) = if desc.msb >= desc.lsb {
                (desc.msb, desc.lsb)
            } else {
                (desc.lsb, desc.msb)
            };
            let slot = lits.get_mut(&wid).expect("unknown wire in scatter");
            for (i, bit_index) in (lo..=hi).enumerate() {
                slot[bit_index as usize] = bits.get(i).copied();
            }
        }
        Signal::Concat(cid) => {
            let children = lib.concats_ro().get(cid).to_vec();
            let mut offset = 0usize;
            for child in children.iter().rev() {
                let width = signal_width(lib, module, lits, *child);
                scatter(lib, module, lits, *child, &bits[offset..(offset + width).min(bits.len())]);
                offset += width;
            }
        }
        Signal::Const(_) => {
            // Assigning into a constant literal is meaningless; the
            // parser never produces this, but silently dropping it (like
            // any other out-of-band write) matches "no error is raised
            // for structurally valid-but-useless input" elsewhere here.
        }
    }
}
