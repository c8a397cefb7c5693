//! Scenario 4 (spec §8): a hierarchical miter of a Booth-encoded and a
//! plain-array 4x4->8 multiplier, both instantiated under hierarchy
//! markers and fed the same operands, must SAT-sweep down to
//! equivalence — not merely blast without error.

use wln_blast::BlastSession;
use wln_fraig::{guide::TaskOutcome, Aig};
use wln_hier::lex::Lexer;
use wln_hier::Lib;
use wln_sat::{Budget, DpllSolver};

fn ingest(src: &str) -> Lib {
    let mut lib = Lib::new();
    wln_hier::ingest(&mut lib, Lexer::new(src)).unwrap();
    lib.normalize().unwrap();
    lib
}

#[test]
fn booth_and_array_multipliers_prove_equal_under_a_hierarchical_miter() {
    let mut lib = ingest(
        "\
module \\mul_array
  wire width 4 input 1 \\a
  wire width 4 input 2 \\b
  wire width 8 output 1 \\y
  cell $mul $1
    connect \\A \\a
    connect \\B \\b
    connect \\Y \\y
  end
end
module \\mul_booth
  wire width 4 input 1 \\a
  wire width 4 input 2 \\b
  wire width 8 output 1 \\y
  cell $mul $1
    parameter \\BOOTH 1
    connect \\A \\a
    connect \\B \\b
    connect \\Y \\y
  end
end
module \\top
  wire width 4 input 1 \\a
  wire width 4 input 2 \\b
  wire width 8 output 1 \\p_array
  wire width 8 output 2 \\p_booth
  cell \\mul_array \\u0
    connect \\a \\a
    connect \\b \\b
    connect \\y \\p_array
  end
  cell \\mul_booth \\u1
    connect \\a \\a
    connect \\b \\b
    connect \\y \\p_booth
  end
end
",
    );
    let array_mid = lib.module_named(lib.names().intern_str("mul_array")).unwrap();
    let booth_mid = lib.module_named(lib.names().intern_str("mul_booth")).unwrap();
    lib.module_mut(array_mid).is_boundary = true;
    lib.module_mut(booth_mid).is_boundary = true;

    let top_mid = lib.module_named(lib.names().intern_str("top")).unwrap();
    let mut aig = Aig::new(8, 1);
    let mut solver = DpllSolver::default();
    let budget = Budget::unbounded();
    let mut session = BlastSession::new(&mut lib);
    let top = session
        .blast(&mut lib, &mut aig, &mut solver, &budget, top_mid)
        .unwrap();

    assert_eq!(top.outputs.len(), 16, "two 8-bit products");
    assert_eq!(aig.barriers.len(), 4, "an in+out barrier pair per instantiated boundary module");

    let (p_array, p_booth) = top.outputs.split_at(8);
    let outcome = wln_fraig::prove_equal(&mut aig, &mut solver, &budget, p_array, p_booth);
    assert_eq!(outcome, TaskOutcome::Equivalent);
}
