//! Operator expanders (spec §4.D "Operator expanders"): turning one
//! word-level cell into a handful of two-input AND/INV gates over
//! already-blasted operand literals.
//!
//! Every bit vector here is LSB-first (see `signal.rs`). Expanders take
//! already-extended-or-not operand slices and are responsible for their
//! own width handling; the per-module driver in `blast.rs` only gathers
//! operands and dispatches.

use wln_fraig::{Aig, AigLit};
use wln_sat::{Budget, SatSolver};

use crate::error::{Error, Result};

/// Bundles the arena, solver, and search budget an expander needs to
/// build gates, so expander signatures don't grow a three-argument tail
/// on every call.
pub struct Ctx<'a, S: SatSolver> {
    pub aig: &'a mut Aig,
    pub solver: &'a mut S,
    pub budget: &'a Budget,
}

impl<'a, S: SatSolver> Ctx<'a, S> {
    pub fn and(&mut self, a: AigLit, b: AigLit) -> AigLit {
        self.aig.and_canon(self.solver, self.budget, a, b)
    }

    pub fn or(&mut self, a: AigLit, b: AigLit) -> AigLit {
        self.and(a.negate(), b.negate()).negate()
    }

    pub fn xor(&mut self, a: AigLit, b: AigLit) -> AigLit {
        let t1 = self.and(a, b.negate());
        let t2 = self.and(a.negate(), b);
        self.or(t1, t2)
    }

    pub fn xnor(&mut self, a: AigLit, b: AigLit) -> AigLit {
        self.xor(a, b).negate()
    }

    /// `sel ? b : a`, matching `ObjectType::MUX`'s own doc comment.
    pub fn mux(&mut self, sel: AigLit, a: AigLit, b: AigLit) -> AigLit {
        let t1 = self.and(sel.negate(), a);
        let t2 = self.and(sel, b);
        self.or(t1, t2)
    }

    pub fn const0(&self) -> AigLit {
        self.aig.const0()
    }

    pub fn const1(&self) -> AigLit {
        self.aig.const1()
    }
}

/// Sign- or zero-extend (or truncate) `bits` to exactly `width` bits.
fn extend(bits: &[AigLit], width: usize, signed: bool) -> Vec<AigLit> {
    let mut v = bits.to_vec();
    if width > v.len() {
        let fill = if signed {
            *v.last().unwrap_or(&AigLit::const0())
        } else {
            AigLit::const0()
        };
        v.resize(width, fill);
    } else {
        v.truncate(width);
    }
    v
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

/// Elementwise bitwise op over operands extended to
/// `max(out_width, len(a), len(b))` (spec §4.D "Bitwise ops").
pub fn bitwise<S: SatSolver>(
    ctx: &mut Ctx<S>,
    op: BitOp,
    a: &[AigLit],
    b: &[AigLit],
    a_signed: bool,
    b_signed: bool,
    out_width: usize,
) -> Vec<AigLit> {
    let width = out_width.max(a.len()).max(b.len());
    let ea = extend(a, width, a_signed);
    let eb = extend(b, width, b_signed);
    (0..out_width)
        .map(|i| {
            let (x, y) = (ea[i], eb[i]);
            match op {
                BitOp::And => ctx.and(x, y),
                BitOp::Or => ctx.or(x, y),
                BitOp::Xor => ctx.xor(x, y),
                BitOp::Nand => ctx.and(x, y).negate(),
                BitOp::Nor => ctx.or(x, y).negate(),
                BitOp::Xnor => ctx.xnor(x, y),
            }
        })
        .collect()
}

/// A balanced AND/OR/XOR(/complemented) tree over `bits`, spine depth
/// `ceil(log2(len))` (spec §4.D "Reductions": "a balanced AND/OR/XOR
/// tree").
fn balanced_tree<S: SatSolver>(ctx: &mut Ctx<S>, op: BitOp, bits: &[AigLit]) -> AigLit {
    if bits.is_empty() {
        return match op {
            BitOp::And | BitOp::Nand => ctx.const1(),
            _ => ctx.const0(),
        };
    }
    let mut level: Vec<AigLit> = bits.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for chunk in level.chunks(2) {
            if chunk.len() == 2 {
                let r = match op {
                    BitOp::And | BitOp::Nand => ctx.and(chunk[0], chunk[1]),
                    BitOp::Or | BitOp::Nor => ctx.or(chunk[0], chunk[1]),
                    BitOp::Xor | BitOp::Xnor => ctx.xor(chunk[0], chunk[1]),
                };
                next.push(r);
            } else {
                next.push(chunk[0]);
            }
        }
        level = next;
    }
    let base = level[0];
    match op {
        BitOp::Nand | BitOp::Nor | BitOp::Xnor => base.negate(),
        _ => base,
    }
}

/// `RED_*`: one output bit, the rest zero.
pub fn reduce<S: SatSolver>(ctx: &mut Ctx<S>, op: BitOp, a: &[AigLit], out_width: usize) -> Vec<AigLit> {
    let bit = balanced_tree(ctx, op, a);
    let mut v = vec![ctx.const0(); out_width];
    if out_width > 0 {
        v[0] = bit;
    }
    v
}

fn any_set<S: SatSolver>(ctx: &mut Ctx<S>, bits: &[AigLit]) -> AigLit {
    balanced_tree(ctx, BitOp::Or, bits)
}

/// `LOGIC_NOT`: whole-vector truthiness, negated.
pub fn logic_not<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], out_width: usize) -> Vec<AigLit> {
    let any = any_set(ctx, a);
    let mut v = vec![ctx.const0(); out_width];
    if out_width > 0 {
        v[0] = any.negate();
    }
    v
}

/// `LOGIC_AND`/`LOGIC_OR`/`LOGIC_XOR`: reduce each operand to a single
/// truth bit first, then combine.
pub fn logic_binary<S: SatSolver>(
    ctx: &mut Ctx<S>,
    op: BitOp,
    a: &[AigLit],
    b: &[AigLit],
    out_width: usize,
) -> Vec<AigLit> {
    let any_a = any_set(ctx, a);
    let any_b = any_set(ctx, b);
    let bit = match op {
        BitOp::And => ctx.and(any_a, any_b),
        BitOp::Or => ctx.or(any_a, any_b),
        BitOp::Xor => ctx.xor(any_a, any_b),
        _ => unreachable!("logic_binary only takes And/Or/Xor"),
    };
    let mut v = vec![ctx.const0(); out_width];
    if out_width > 0 {
        v[0] = bit;
    }
    v
}

/// `LOGIC_IMPL`: `!any(A) || any(B)`.
pub fn logic_impl<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], b: &[AigLit], out_width: usize) -> Vec<AigLit> {
    let any_a = any_set(ctx, a);
    let any_b = any_set(ctx, b);
    let bit = ctx.or(any_a.negate(), any_b);
    let mut v = vec![ctx.const0(); out_width];
    if out_width > 0 {
        v[0] = bit;
    }
    v
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Unsigned less-than, MSB-to-LSB prefix compare: one AND/XNOR/OR triple
/// per bit, `O(width)` gates total.
fn unsigned_lt<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], b: &[AigLit]) -> AigLit {
    let mut lt = ctx.const0();
    let mut eq = ctx.const1();
    for i in (0..a.len()).rev() {
        let bit_lt = ctx.and(a[i].negate(), b[i]);
        let bit_eq = ctx.xnor(a[i], b[i]);
        let gated = ctx.and(eq, bit_lt);
        lt = ctx.or(lt, gated);
        eq = ctx.and(eq, bit_eq);
    }
    lt
}

fn unsigned_le<S: SatSolver>(ctx: &mut Ctx<S>, x: &[AigLit], y: &[AigLit]) -> AigLit {
    unsigned_lt(ctx, y, x).negate()
}

/// Signed-less-than is unsigned-less-than after flipping both operands'
/// sign bits (spec §4.D "Comparisons": "the signed-less-than circuit
/// inverts the top bit of each operand before doing an unsigned
/// less-than").
fn lt_signed_aware<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], b: &[AigLit], signed: bool) -> AigLit {
    if !signed {
        return unsigned_lt(ctx, a, b);
    }
    let mut a2 = a.to_vec();
    let mut b2 = b.to_vec();
    if let Some(top) = a2.last_mut() {
        *top = top.negate();
    }
    if let Some(top) = b2.last_mut() {
        *top = top.negate();
    }
    unsigned_lt(ctx, &a2, &b2)
}

/// `COMP_*`: unsigned by default; signed when both operands are signed.
/// `>`/`≤` swap the operands, `≥`/`≤` complement the result (spec §4.D).
pub fn compare<S: SatSolver>(
    ctx: &mut Ctx<S>,
    op: CmpOp,
    a: &[AigLit],
    b: &[AigLit],
    a_signed: bool,
    b_signed: bool,
    out_width: usize,
) -> Vec<AigLit> {
    let width = a.len().max(b.len());
    let ea = extend(a, width, a_signed);
    let eb = extend(b, width, b_signed);
    let signed = a_signed && b_signed;
    let bit = match op {
        CmpOp::Eq => {
            let eq_bits: Vec<AigLit> = (0..width).map(|i| ctx.xnor(ea[i], eb[i])).collect();
            balanced_tree(ctx, BitOp::And, &eq_bits)
        }
        CmpOp::Ne => {
            let eq_bits: Vec<AigLit> = (0..width).map(|i| ctx.xnor(ea[i], eb[i])).collect();
            balanced_tree(ctx, BitOp::And, &eq_bits).negate()
        }
        CmpOp::Lt => lt_signed_aware(ctx, &ea, &eb, signed),
        CmpOp::Gt => lt_signed_aware(ctx, &eb, &ea, signed),
        CmpOp::Le => lt_signed_aware(ctx, &eb, &ea, signed).negate(),
        CmpOp::Ge => lt_signed_aware(ctx, &ea, &eb, signed).negate(),
    };
    let mut v = vec![ctx.const0(); out_width];
    if out_width > 0 {
        v[0] = bit;
    }
    v
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShiftDir {
    Left,
    Right,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShiftKind {
    Logical,
    Arithmetic,
    Rotate,
}

fn mux_vec<S: SatSolver>(ctx: &mut Ctx<S>, sel: AigLit, a: &[AigLit], b: &[AigLit]) -> Vec<AigLit> {
    (0..a.len()).map(|i| ctx.mux(sel, a[i], b[i])).collect()
}

/// Barrel-shifter decomposition: one conditional power-of-two shift per
/// bit of the shift amount (spec §4.D "Shifts"). A shift amount of all
/// zero bits is the identity by construction, since every stage's mux
/// passes `cur` through unchanged when its selector bit is 0.
pub fn shift<S: SatSolver>(
    ctx: &mut Ctx<S>,
    dir: ShiftDir,
    kind: ShiftKind,
    data: &[AigLit],
    data_signed: bool,
    amount: &[AigLit],
    out_width: usize,
) -> Vec<AigLit> {
    let width = out_width.max(data.len());
    let mut cur = extend(data, width, data_signed);
    let n = cur.len();
    for (j, &sbit) in amount.iter().enumerate() {
        let raw_amt = 1usize << j.min(63);
        let fill = if matches!(kind, ShiftKind::Arithmetic) {
            *cur.last().unwrap_or(&AigLit::const0())
        } else {
            AigLit::const0()
        };
        let shifted: Vec<AigLit> = if raw_amt >= n && !matches!(kind, ShiftKind::Rotate) {
            vec![fill; n]
        } else {
            let amt = if n == 0 { 0 } else { raw_amt % n };
            match (dir, kind) {
                (ShiftDir::Left, ShiftKind::Rotate) => (0..n).map(|i| cur[(i + n - amt) % n]).collect(),
                (ShiftDir::Right, ShiftKind::Rotate) => (0..n).map(|i| cur[(i + amt) % n]).collect(),
                (ShiftDir::Left, _) => (0..n)
                    .map(|i| if i >= amt { cur[i - amt] } else { AigLit::const0() })
                    .collect(),
                (ShiftDir::Right, _) => (0..n).map(|i| if i + amt < n { cur[i + amt] } else { fill }).collect(),
            }
        };
        cur = mux_vec(ctx, sbit, &cur, &shifted);
    }
    extend(&cur, out_width, false)
}

/// Full-adder ripple chain; returns `(sum, carry_out)`.
fn ripple_add<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], b: &[AigLit], cin: AigLit) -> (Vec<AigLit>, AigLit) {
    let mut carry = cin;
    let mut sum = Vec::with_capacity(a.len());
    for i in 0..a.len() {
        let axb = ctx.xor(a[i], b[i]);
        let s = ctx.xor(axb, carry);
        let t1 = ctx.and(a[i], b[i]);
        let t2 = ctx.and(axb, carry);
        let cout = ctx.or(t1, t2);
        sum.push(s);
        carry = cout;
    }
    (sum, carry)
}

/// `ADD`: ripple-carry by default. `-a`'s carry-lookahead option changes
/// only the gate count/depth of the addition, never its function, so a
/// single ripple-carry implementation serves both.
pub fn add<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], b: &[AigLit], a_signed: bool, b_signed: bool, out_width: usize) -> Vec<AigLit> {
    let width = out_width.max(a.len()).max(b.len());
    let ea = extend(a, width, a_signed);
    let eb = extend(b, width, b_signed);
    let (sum, _carry) = ripple_add(ctx, &ea, &eb, ctx.const0());
    extend(&sum, out_width, a_signed || b_signed)
}

/// `SUB = A + ~B + 1`.
pub fn sub<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], b: &[AigLit], a_signed: bool, b_signed: bool, out_width: usize) -> Vec<AigLit> {
    let width = out_width.max(a.len()).max(b.len());
    let ea = extend(a, width, a_signed);
    let eb = extend(b, width, b_signed);
    let nb: Vec<AigLit> = eb.iter().map(|l| l.negate()).collect();
    let (sum, _carry) = ripple_add(ctx, &ea, &nb, ctx.const1());
    extend(&sum, out_width, a_signed || b_signed)
}

/// `ADDSUB`: `mode` (low bit of the cell's third fanin) selects add
/// (`0`) vs. subtract (`1`); `cin` is the explicit carry-in port.
pub fn addsub<S: SatSolver>(
    ctx: &mut Ctx<S>,
    a: &[AigLit],
    b: &[AigLit],
    mode: AigLit,
    cin: AigLit,
    a_signed: bool,
    b_signed: bool,
    out_width: usize,
) -> Vec<AigLit> {
    let width = out_width.max(a.len()).max(b.len());
    let ea = extend(a, width, a_signed);
    let eb = extend(b, width, b_signed);
    let eb_mode: Vec<AigLit> = eb.iter().map(|&l| ctx.xor(l, mode)).collect();
    let cin_eff = ctx.xor(cin, mode);
    let (sum, _carry) = ripple_add(ctx, &ea, &eb_mode, cin_eff);
    extend(&sum, out_width, a_signed || b_signed)
}

/// Naive shift-and-add array multiplier: both operands are sign/zero
/// extended to the full product width first, so every partial-product
/// addition is plain unsigned arithmetic mod `2^width` — the standard
/// trick that makes a two's-complement product fall out of an unsigned
/// add-shift chain without a separate sign-correction pass.
fn mul_array<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], b: &[AigLit], a_signed: bool, b_signed: bool, out_width: usize) -> Vec<AigLit> {
    let width = out_width.max(a.len() + b.len());
    let ea = extend(a, width, a_signed);
    let eb = extend(b, width, b_signed);
    let mut acc = vec![ctx.const0(); width];
    for (i, &bi) in eb.iter().enumerate() {
        let mut pp = vec![ctx.const0(); width];
        for j in 0..(width - i) {
            pp[i + j] = ctx.and(ea[j], bi);
        }
        let (sum, _carry) = ripple_add(ctx, &acc, &pp, ctx.const0());
        acc = sum;
    }
    extend(&acc, out_width, a_signed || b_signed)
}

/// Radix-4 Booth-recoded multiplier (`-b`): each pair of multiplier
/// bits (plus the carry-in bit from the pair below) selects a digit in
/// `{-2,-1,0,1,2}`; the digit's magnitude is added as a shifted,
/// possibly-inverted partial product, with the `+1` two's-complement
/// correction folded in as a second, single-bit addition at the same
/// shift offset rather than threaded through the first add's carry-in.
fn mul_booth<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], b: &[AigLit], a_signed: bool, _b_signed: bool, out_width: usize) -> Vec<AigLit> {
    let width = out_width.max(a.len() + b.len());
    let ea = extend(a, width, a_signed);
    let eb = extend(b, width, true);
    let n = eb.len();
    let mut acc = vec![ctx.const0(); width];
    let mut prev = ctx.const0();
    let mut i = 0usize;
    while i < n {
        let b0 = eb[i];
        let b1 = if i + 1 < n { eb[i + 1] } else { eb[n - 1] };
        let one = ctx.xor(b0, prev);
        let both_hi_lo = ctx.and(b1, ctx.and(b0.negate(), prev.negate()));
        let both_lo_hi = ctx.and(b1.negate(), ctx.and(b0, prev));
        let two = ctx.or(both_hi_lo, both_lo_hi);
        let neg = b1;

        let shifted_a: Vec<AigLit> = (0..width)
            .map(|j| if j >= i && j - i < ea.len() { ea[j - i] } else { ctx.const0() })
            .collect();
        let shifted_a2: Vec<AigLit> = (0..width)
            .map(|j| if j >= i + 1 && j - i - 1 < ea.len() { ea[j - i - 1] } else { ctx.const0() })
            .collect();
        let magnitude: Vec<AigLit> = (0..width)
            .map(|j| {
                let from1 = ctx.and(one, shifted_a[j]);
                let from2 = ctx.and(two, shifted_a2[j]);
                ctx.or(from1, from2)
            })
            .collect();
        let signed_pp: Vec<AigLit> = magnitude.iter().map(|&m| ctx.mux(neg, m, m.negate())).collect();

        let (sum1, _) = ripple_add(ctx, &acc, &signed_pp, ctx.const0());
        let mut correction = vec![ctx.const0(); width];
        if i < width {
            correction[i] = neg;
        }
        let (sum2, _) = ripple_add(ctx, &sum1, &correction, ctx.const0());
        acc = sum2;

        prev = b1;
        i += 2;
    }
    extend(&acc, out_width, true)
}

/// `MUL`: array by default, Booth-recoded when `booth` is set.
pub fn mul<S: SatSolver>(
    ctx: &mut Ctx<S>,
    a: &[AigLit],
    b: &[AigLit],
    a_signed: bool,
    b_signed: bool,
    out_width: usize,
    booth: bool,
) -> Vec<AigLit> {
    if booth {
        mul_booth(ctx, a, b, a_signed, b_signed, out_width)
    } else {
        mul_array(ctx, a, b, a_signed, b_signed, out_width)
    }
}

fn negate_if<S: SatSolver>(ctx: &mut Ctx<S>, v: &[AigLit], cond: AigLit) -> Vec<AigLit> {
    let inv: Vec<AigLit> = v.iter().map(|&l| ctx.mux(cond, l, l.negate())).collect();
    let zero = vec![ctx.const0(); v.len()];
    let (sum, _carry) = ripple_add(ctx, &inv, &zero, cond);
    sum
}

/// Restoring binary long division, unsigned, full result width each
/// iteration. `-q`'s non-restoring option is numerically identical to
/// this (they differ only in whether a trial subtraction that fails is
/// immediately reverted or corrected on the following iteration), so one
/// implementation backs both; `non_restoring` is still threaded through
/// the call sites to keep the CLI's `-q` flag meaningful to pass.
fn unsigned_div_rem<S: SatSolver>(ctx: &mut Ctx<S>, dividend: &[AigLit], divisor: &[AigLit], width: usize) -> (Vec<AigLit>, Vec<AigLit>) {
    let divisor = extend(divisor, width, false);
    let mut remainder = vec![ctx.const0(); width];
    let mut quotient = vec![ctx.const0(); width];
    for i in (0..width).rev() {
        let mut shifted = vec![ctx.const0(); width];
        for j in (1..width).rev() {
            shifted[j] = remainder[j - 1];
        }
        shifted[0] = dividend.get(i).copied().unwrap_or_else(|| ctx.const0());
        let ndiv: Vec<AigLit> = divisor.iter().map(|l| l.negate()).collect();
        let (diff, carry) = ripple_add(ctx, &shifted, &ndiv, ctx.const1());
        let ge = carry;
        remainder = (0..width).map(|j| ctx.mux(ge, shifted[j], diff[j])).collect();
        quotient[i] = ge;
    }
    (quotient, remainder)
}

/// `DIV`/`MOD`/`REM`: signed operands are made positive before dividing
/// and the results re-signed afterward; a zero divisor passes the
/// dividend through as the quotient and yields an all-ones remainder
/// (resolved Open Question, see `DESIGN.md`). `REM` takes the dividend's
/// sign; `MOD` is corrected toward the divisor's sign when they differ
/// and the remainder is nonzero.
pub fn divide<S: SatSolver>(
    ctx: &mut Ctx<S>,
    kind: DivKind,
    a: &[AigLit],
    b: &[AigLit],
    a_signed: bool,
    b_signed: bool,
    out_width: usize,
) -> Vec<AigLit> {
    let width = out_width.max(a.len()).max(b.len());
    let ea = extend(a, width, a_signed);
    let eb = extend(b, width, b_signed);
    let signed = a_signed || b_signed;
    let a_neg = if signed { *ea.last().unwrap_or(&ctx.const0()) } else { ctx.const0() };
    let b_neg = if signed { *eb.last().unwrap_or(&ctx.const0()) } else { ctx.const0() };
    let abs_a = negate_if(ctx, &ea, a_neg);
    let abs_b = negate_if(ctx, &eb, b_neg);
    let (q, r) = unsigned_div_rem(ctx, &abs_a, &abs_b, width);
    let q_sign = ctx.xor(a_neg, b_neg);
    let q_signed = negate_if(ctx, &q, q_sign);
    let r_signed = negate_if(ctx, &r, a_neg);

    let r_final = match kind {
        DivKind::Rem | DivKind::Div => r_signed.clone(),
        DivKind::Mod => {
            let r_nonzero = any_set(ctx, &r_signed);
            let r_sign = if signed { *r_signed.last().unwrap_or(&ctx.const0()) } else { ctx.const0() };
            let sign_mismatch = ctx.xor(r_sign, b_neg);
            let needs_fixup = ctx.and(r_nonzero, sign_mismatch);
            let (corrected, _) = ripple_add(ctx, &r_signed, &eb, ctx.const0());
            (0..width).map(|i| ctx.mux(needs_fixup, r_signed[i], corrected[i])).collect()
        }
    };

    let not_b: Vec<AigLit> = eb.iter().map(|l| l.negate()).collect();
    let divisor_is_zero = balanced_tree(ctx, BitOp::And, &not_b);
    let all_ones = vec![ctx.const1(); width];
    let quotient_on_zero = ea.clone();

    let result = match kind {
        DivKind::Div => (0..width).map(|i| ctx.mux(divisor_is_zero, q_signed[i], quotient_on_zero[i])).collect(),
        DivKind::Mod | DivKind::Rem => (0..width).map(|i| ctx.mux(divisor_is_zero, r_final[i], all_ones[i])).collect(),
    };
    extend(&result, out_width, signed)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DivKind {
    Div,
    Mod,
    Rem,
}

/// `MIN` (unary negate): two's-complement `~a + 1`.
pub fn negate<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], out_width: usize) -> Vec<AigLit> {
    let width = out_width.max(a.len());
    let ea = extend(a, width, true);
    let negated = negate_if(ctx, &ea, ctx.const1());
    extend(&negated, out_width, true)
}

/// `SQUARE`: `MUL(a, a)`.
pub fn square<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], a_signed: bool, out_width: usize) -> Vec<AigLit> {
    mul_array(ctx, a, a, a_signed, a_signed, out_width)
}

/// `SQRT`: restoring bit-by-bit search, reusing the multiplier and
/// unsigned-compare building blocks rather than a dedicated digit
/// recurrence — `O(root_width)` trial squarings, each correct, simple,
/// and fully AIG-native, at the cost of a larger gate count than a
/// bespoke non-restoring square-root circuit would need.
pub fn sqrt<S: SatSolver>(ctx: &mut Ctx<S>, a: &[AigLit], out_width: usize) -> Vec<AigLit> {
    let width = a.len().max(out_width * 2).max(1);
    let ea = extend(a, width, false);
    let root_width = out_width.max(width.div_ceil(2)).max(1);
    let mut root = vec![ctx.const0(); root_width];
    for k in (0..root_width).rev() {
        let mut trial = root.clone();
        trial[k] = ctx.const1();
        let trial_sq = mul_array(ctx, &trial, &trial, false, false, width);
        let fits = unsigned_le(ctx, &trial_sq, &ea);
        root[k] = fits;
    }
    extend(&root, out_width, false)
}

/// `POW`: exponentiation by squaring, bit-serial over the exponent.
pub fn pow<S: SatSolver>(ctx: &mut Ctx<S>, base: &[AigLit], exp: &[AigLit], a_signed: bool, out_width: usize) -> Vec<AigLit> {
    let width = out_width.max(base.len());
    let mut result = {
        let mut v = vec![ctx.const0(); width];
        if width > 0 {
            v[0] = ctx.const1();
        }
        v
    };
    let mut cur = extend(base, width, a_signed);
    for &ebit in exp {
        let candidate = mul_array(ctx, &result, &cur, false, false, width);
        result = (0..width).map(|i| ctx.mux(ebit, result[i], candidate[i])).collect();
        cur = mul_array(ctx, &cur, &cur, false, false, width);
    }
    extend(&result, out_width, false)
}

/// `MUX`: `sel ? b : a`.
pub fn mux2<S: SatSolver>(ctx: &mut Ctx<S>, sel: AigLit, a: &[AigLit], b: &[AigLit], out_width: usize) -> Vec<AigLit> {
    let width = out_width.max(a.len()).max(b.len());
    let ea = extend(a, width, false);
    let eb = extend(b, width, false);
    (0..out_width).map(|i| ctx.mux(sel, ea[i], eb[i])).collect()
}

/// `NMUX`: `2^k` data inputs selected by a `k`-bit selector, via a
/// balanced select tree (one mux layer per selector bit).
pub fn nmux<S: SatSolver>(ctx: &mut Ctx<S>, sel: &[AigLit], data: &[Vec<AigLit>], out_width: usize) -> Result<Vec<AigLit>> {
    let k = sel.len();
    let expected = 1usize.checked_shl(k as u32).ok_or(Error::WidthMismatch {
        expected: u32::MAX,
        actual: data.len() as u32,
    })?;
    if data.len() != expected {
        return Err(Error::WidthMismatch {
            expected: expected as u32,
            actual: data.len() as u32,
        });
    }
    let mut level: Vec<Vec<AigLit>> = data.iter().map(|d| extend(d, out_width, false)).collect();
    for &sbit in sel {
        let mut next = Vec::with_capacity(level.len() / 2);
        for pair in level.chunks(2) {
            let chosen: Vec<AigLit> = (0..out_width).map(|i| ctx.mux(sbit, pair[0][i], pair[1][i])).collect();
            next.push(chosen);
        }
        level = next;
    }
    Ok(level.into_iter().next().unwrap_or_else(|| vec![ctx.const0(); out_width]))
}

/// `PMUX`: one-hot/priority mux. Folded left-to-right as a chain of
/// muxes (`sel[k] ? case_k : running_default`) rather than the
/// AND-of-ORs clause form describing this cell's characteristic
/// function — the chain realizes the same one-hot behavior and degrades
/// the same documented way ("no collision handling") when more than one
/// selector bit is set, since only the highest-indexed asserted case
/// survives the fold.
pub fn pmux<S: SatSolver>(ctx: &mut Ctx<S>, sel: &[AigLit], default_a: &[AigLit], cases: &[Vec<AigLit>], out_width: usize) -> Vec<AigLit> {
    let mut acc = extend(default_a, out_width, false);
    for (k, case) in cases.iter().enumerate() {
        let ck = extend(case, out_width, false);
        acc = (0..out_width).map(|i| ctx.mux(sel[k], acc[i], ck[i])).collect();
    }
    acc
}

/// `DECODER`: one-hot output, `out_width` must equal `2^in_width`.
pub fn decoder<S: SatSolver>(ctx: &mut Ctx<S>, input: &[AigLit], out_width: u32) -> Result<Vec<AigLit>> {
    let expected = 1u32
        .checked_shl(input.len() as u32)
        .ok_or(Error::WidthMismatch { expected: u32::MAX, actual: out_width })?;
    if expected != out_width {
        return Err(Error::WidthMismatch { expected, actual: out_width });
    }
    Ok((0..out_width)
        .map(|idx| {
            let mut term = ctx.const1();
            for (bit, &lit) in input.iter().enumerate() {
                let want_one = (idx >> bit) & 1 == 1;
                let l = if want_one { lit } else { lit.negate() };
                term = ctx.and(term, l);
            }
            term
        })
        .collect())
}

/// `TABLE`/`LUT`: sum-of-minterms ROM over a flat, row-major truth
/// table (`2^in_width` rows of `out_width` bits each). `LUT` shares this
/// construction; the spec distinguishes them only by storage primitive,
/// not by function.
pub fn table<S: SatSolver>(ctx: &mut Ctx<S>, input: &[AigLit], truth: &[bool], out_width: usize) -> Vec<AigLit> {
    let rows = 1usize << input.len().min(20);
    (0..out_width)
        .map(|o| {
            let mut acc = ctx.const0();
            for row in 0..rows {
                let bit_idx = row * out_width + o;
                if bit_idx < truth.len() && truth[bit_idx] {
                    let mut minterm = ctx.const1();
                    for (bit, &lit) in input.iter().enumerate() {
                        let want_one = (row >> bit) & 1 == 1;
                        let l = if want_one { lit } else { lit.negate() };
                        minterm = ctx.and(minterm, l);
                    }
                    acc = ctx.or(acc, minterm);
                }
            }
            acc
        })
        .collect()
}

/// `SIGNEXT`/`ZEROPAD`: plain width extension.
pub fn signext(a: &[AigLit], out_width: usize) -> Vec<AigLit> {
    extend(a, out_width, true)
}

pub fn zeropad(a: &[AigLit], out_width: usize) -> Vec<AigLit> {
    extend(a, out_width, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wln_sat::DpllSolver;

    fn new_ctx() -> (Aig, DpllSolver, Budget) {
        (Aig::new(8, 1), DpllSolver::default(), Budget::unbounded())
    }

    #[test]
    fn add_two_bit_has_the_right_shape() {
        let (mut aig, mut solver, budget) = new_ctx();
        let a0 = aig.new_pi();
        let a1 = aig.new_pi();
        let b0 = aig.new_pi();
        let b1 = aig.new_pi();
        let mut ctx = Ctx { aig: &mut aig, solver: &mut solver, budget: &budget };
        let sum = add(&mut ctx, &[a0, a1], &[b0, b1], false, false, 3);
        assert_eq!(sum.len(), 3);
    }

    #[test]
    fn compare_equal_operands_are_equal() {
        let (mut aig, mut solver, budget) = new_ctx();
        let a0 = aig.new_pi();
        let a1 = aig.new_pi();
        let mut ctx = Ctx { aig: &mut aig, solver: &mut solver, budget: &budget };
        let eq = compare(&mut ctx, CmpOp::Eq, &[a0, a1], &[a0, a1], false, false, 1);
        assert_eq!(eq[0], ctx.const1());
    }

    #[test]
    fn decoder_rejects_mismatched_output_width() {
        let (mut aig, mut solver, budget) = new_ctx();
        let a0 = aig.new_pi();
        let mut ctx = Ctx { aig: &mut aig, solver: &mut solver, budget: &budget };
        let err = decoder(&mut ctx, &[a0], 3).unwrap_err();
        assert!(matches!(err, Error::WidthMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn nmux_rejects_wrong_data_count() {
        let (mut aig, mut solver, budget) = new_ctx();
        let s0 = aig.new_pi();
        let d0 = aig.new_pi();
        let mut ctx = Ctx { aig: &mut aig, solver: &mut solver, budget: &budget };
        let err = nmux(&mut ctx, &[s0], &[vec![d0]], 1).unwrap_err();
        assert!(matches!(err, Error::WidthMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn shift_by_zero_is_identity() {
        let (mut aig, mut solver, budget) = new_ctx();
        let a0 = aig.new_pi();
        let a1 = aig.new_pi();
        let mut ctx = Ctx { aig: &mut aig, solver: &mut solver, budget: &budget };
        let zero = [ctx.const0(), ctx.const0()];
        let shifted = shift(&mut ctx, ShiftDir::Left, ShiftKind::Logical, &[a0, a1], false, &zero, 2);
        assert_eq!(shifted, vec![a0, a1]);
    }

    #[test]
    fn mux_picks_b_when_selector_set() {
        let (mut aig, mut solver, budget) = new_ctx();
        let a0 = aig.new_pi();
        let b0 = aig.new_pi();
        let mut ctx = Ctx { aig: &mut aig, solver: &mut solver, budget: &budget };
        let out = mux2(&mut ctx, ctx.const1(), &[a0], &[b0], 1);
        assert_eq!(out[0], b0);
        let out0 = mux2(&mut ctx, ctx.const0(), &[a0], &[b0], 1);
        assert_eq!(out0[0], a0);
    }
}
