//! Scenario 6 (spec §8): a combinational cycle between two `AND` nodes
//! must be reported as a `Cycle` error naming both nodes, run as a
//! crate-level acceptance test alongside the unit test covering the same
//! case inside `network.rs`.

use wln_ir::{Error, Network, ObjectType};

#[test]
fn two_ands_feeding_each_other_are_reported_as_a_cycle() {
    let mut net = Network::new("m");
    let pi = net.new_object(ObjectType::CI, false, 0, 0);
    let w1 = net.new_object(ObjectType::AND, false, 0, 0);
    let w2 = net.new_object(ObjectType::AND, false, 0, 0);
    net.add_fanin(w2, w1).unwrap();
    net.add_fanin(w2, pi).unwrap();
    net.add_fanin(w1, w2).unwrap();
    net.add_fanin(w1, pi).unwrap();
    let co = net.new_object(ObjectType::CO, false, 0, 0);
    net.add_fanin(co, w1).unwrap();

    let err = net.acyclicity_check().unwrap_err();
    match err {
        Error::Cycle { path, .. } => {
            assert!(path.contains(&w1));
            assert!(path.contains(&w2));
        }
        other => panic!("expected Cycle, got {other:?}"),
    }
}
