//! A DFF whose `d` input depends combinationally on its own `q` output is
//! fine (that is the whole point of a register); only a *combinational*
//! cycle is rejected. This exercises `acyclicity_check`'s root set (every
//! CO and every DFF) together with the DFFRSE fanin ordering contract
//! (spec §3.3).

use wln_ir::{Network, ObjectType};

#[test]
fn register_feedback_through_a_dff_is_acyclic() {
    let mut net = Network::new("counter");
    let clk = net.new_object(ObjectType::CI, false, 0, 0);
    let q = net.new_object(ObjectType::DFFRSE, false, 7, 0);
    let one = net.new_object(ObjectType::CONST, false, 7, 0);
    let name = net.names().intern_str("8'b00000001");
    net.set_const(one, name).unwrap();
    let next = net.new_object(ObjectType::ADD, false, 7, 0);
    net.add_fanin(next, q).unwrap();
    net.add_fanin(next, one).unwrap();

    // DFFRSE fanin order: (d, clk, reset, set, enable, async, sre, init).
    net.add_fanin(q, next).unwrap();
    net.add_fanin(q, clk).unwrap();

    let co = net.new_object(ObjectType::CO, false, 7, 0);
    net.add_fanin(co, q).unwrap();

    assert!(net.acyclicity_check().is_ok());

    net.rebuild_fanouts();
    assert_eq!(net.ref_count(q), 2, "q feeds both the adder and the output");
    assert_eq!(net.ref_count(next), 1, "next feeds only the dff's d input");
}
