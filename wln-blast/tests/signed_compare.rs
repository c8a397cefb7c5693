//! Scenario 2 (spec §8): a signed less-than comparator must match two's
//! complement semantics, not just unsigned bit-pattern order — the whole
//! point of `A_SIGNED`/`B_SIGNED`.

use wln_blast::BlastSession;
use wln_fraig::Aig;
use wln_hier::lex::Lexer;
use wln_hier::Lib;
use wln_sat::{Budget, DpllSolver};

fn ingest(src: &str) -> Lib {
    let mut lib = Lib::new();
    wln_hier::ingest(&mut lib, Lexer::new(src)).unwrap();
    lib.normalize().unwrap();
    lib
}

/// 4-bit two's complement bits, LSB-first.
fn to_bits4(v: i8) -> Vec<bool> {
    let u = v as u8;
    (0..4).map(|i| (u >> i) & 1 == 1).collect()
}

#[test]
fn signed_less_than_matches_twos_complement_ordering() {
    let mut lib = ingest(
        "\
module \\top
  wire width 4 input 1 \\a
  wire width 4 input 2 \\b
  wire width 1 output 1 \\y
  cell $lt $1
    parameter \\A_SIGNED 1
    parameter \\B_SIGNED 1
    connect \\A \\a
    connect \\B \\b
    connect \\Y \\y
  end
end
",
    );
    let mid = lib.module_named(lib.names().intern_str("top")).unwrap();
    let mut aig = Aig::new(8, 1);
    let mut solver = DpllSolver::default();
    let budget = Budget::unbounded();
    let mut session = BlastSession::new(&mut lib);
    let result = session
        .blast(&mut lib, &mut aig, &mut solver, &budget, mid)
        .unwrap();
    assert_eq!(result.outputs.len(), 1);

    let cases: [(i8, i8, bool); 3] = [(-8, 7, true), (7, -8, false), (0, 0, false)];
    for (i, &(a, b, expected)) in cases.iter().enumerate() {
        let mut pi_values = to_bits4(a);
        pi_values.extend(to_bits4(b));
        aig.append_dyn_pattern(&pi_values);
        let got = aig.lit_dyn_bit(result.outputs[0], i);
        assert_eq!(got, expected, "a={a} b={b}: signed lt returned {got}, expected {expected}");
    }
}
