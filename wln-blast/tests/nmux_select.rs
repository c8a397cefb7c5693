//! Scenario 3 (spec §8): a 4-to-1 `NMUX` must read back the selected
//! data input's value for every selector setting, not just blast without
//! a width mismatch.

use wln_blast::BlastSession;
use wln_fraig::{Aig, AigLit};
use wln_hier::lex::Lexer;
use wln_hier::Lib;
use wln_sat::{Budget, DpllSolver};

fn ingest(src: &str) -> Lib {
    let mut lib = Lib::new();
    wln_hier::ingest(&mut lib, Lexer::new(src)).unwrap();
    lib.normalize().unwrap();
    lib
}

fn bits_lsb(value: u32, width: usize) -> Vec<bool> {
    (0..width).map(|i| (value >> i) & 1 == 1).collect()
}

fn bits_to_value(aig: &Aig, bits: &[AigLit], pattern: usize) -> u32 {
    bits.iter()
        .enumerate()
        .fold(0u32, |acc, (i, &lit)| acc | ((aig.lit_dyn_bit(lit, pattern) as u32) << i))
}

#[test]
fn nmux_selects_the_addressed_data_input_for_every_selector_value() {
    let mut lib = ingest(
        "\
module \\top
  wire width 2 input 1 \\s
  wire width 4 input 2 \\d0
  wire width 4 input 3 \\d1
  wire width 4 input 4 \\d2
  wire width 4 input 5 \\d3
  wire width 4 output 1 \\y
  cell $nmux $1
    connect \\S \\s
    connect \\B0 \\d0
    connect \\B1 \\d1
    connect \\B2 \\d2
    connect \\B3 \\d3
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
    assert_eq!(result.outputs.len(), 4);

    let data_values: [u32; 4] = [0b0001, 0b0010, 0b0100, 0b1000];
    for (pattern, &sel) in (0u32..4).enumerate() {
        let mut pi_values = bits_lsb(sel, 2);
        for &d in &data_values {
            pi_values.extend(bits_lsb(d, 4));
        }
        aig.append_dyn_pattern(&pi_values);
        let got = bits_to_value(&aig, &result.outputs, pattern);
        assert_eq!(got, data_values[sel as usize], "selector {sel}: got {got:#06b}");
    }
}
