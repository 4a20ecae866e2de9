//! Small synthetic circuits exercising group resolution and propagation.

use nmos_switch::{Drive, Network, NetworkConfig, NetworkDescription, NetworkError, NodeId, TransistorDef};

const POWER: NodeId = 0;
const GROUND: NodeId = 1;

/// Incrementally assembled netlist.
struct Circuit {
    pullups: Vec<bool>,
    transistors: Vec<TransistorDef>,
}

impl Circuit {
    fn new() -> Self {
        Self {
            pullups: vec![false, false],
            transistors: Vec::new(),
        }
    }

    fn node(&mut self) -> NodeId {
        self.pullups.push(false);
        self.pullups.len() - 1
    }

    fn pulled_up(&mut self) -> NodeId {
        self.pullups.push(true);
        self.pullups.len() - 1
    }

    fn transistor(&mut self, gate: NodeId, c1: NodeId, c2: NodeId) {
        self.transistors.push(TransistorDef::new(gate, c1, c2));
    }

    /// NMOS inverter driven by `input`; returns the output node.
    fn inverter(&mut self, input: NodeId) -> NodeId {
        let out = self.pulled_up();
        self.transistor(input, out, GROUND);
        out
    }

    /// NMOS NOR of `inputs`; returns the output node.
    fn nor(&mut self, inputs: &[NodeId]) -> NodeId {
        let out = self.pulled_up();
        for &i in inputs {
            self.transistor(i, out, GROUND);
        }
        out
    }

    fn description(&self) -> NetworkDescription {
        NetworkDescription {
            pullups: self.pullups.clone(),
            transistors: self.transistors.clone(),
            power: POWER,
            ground: GROUND,
        }
    }

    fn build(&self) -> Network {
        Network::new(&self.description()).unwrap()
    }
}

/// Every transistor conducts exactly when its gate is high.
fn assert_gates_consistent(net: &Network) {
    for t in 0..net.transistor_count() {
        let (def, on) = net.transistor(t).unwrap();
        assert_eq!(on, net.get(def.gate), "transistor {t} out of sync with its gate");
    }
}

#[test]
fn pullup_only_node_resolves_high() {
    let mut c = Circuit::new();
    let n = c.pulled_up();
    let mut net = c.build();
    net.stabilize();
    assert!(net.get(n));
}

#[test]
fn pulldown_only_node_resolves_low() {
    let mut c = Circuit::new();
    let n = c.pulled_up();
    let mut net = c.build();
    net.stabilize();
    net.set(n, false);
    net.recalc();
    assert!(!net.get(n));
    assert_eq!(net.drive(n), Drive::PullDown);
}

#[test]
fn always_on_path_to_ground_beats_own_pullup() {
    let mut c = Circuit::new();
    let n = c.pulled_up();
    c.transistor(POWER, n, GROUND);
    let mut net = c.build();
    net.stabilize();
    assert!(!net.get(n));
    assert_gates_consistent(&net);
}

#[test]
fn never_charged_floating_node_resolves_low() {
    let mut c = Circuit::new();
    let n = c.node();
    let mut net = c.build();
    net.stabilize();
    assert!(!net.get(n));
}

#[test]
fn sentinels_are_fixed_at_every_step() {
    let mut c = Circuit::new();
    let a = c.pulled_up();
    c.transistor(a, POWER, GROUND);
    let mut net = c.build();
    for step in 0..4 {
        assert!(net.get(POWER) && !net.get(GROUND), "step {step}");
        net.set(a, step % 2 == 0);
        net.recalc();
    }
    net.stabilize();
    assert!(net.get(POWER) && !net.get(GROUND));
}

#[test]
fn recalc_on_settled_network_changes_nothing() {
    let mut c = Circuit::new();
    let input = c.node();
    let out = c.inverter(input);
    c.inverter(out);
    let mut net = c.build();
    net.stabilize();
    let before = net.snapshot();
    net.recalc();
    assert_eq!(net.snapshot(), before);
    assert!(net.is_settled());
}

#[test]
fn writing_the_current_drive_queues_nothing() {
    let mut c = Circuit::new();
    let input = c.node();
    c.inverter(input);
    let mut net = c.build();
    net.set(input, true);
    net.stabilize();
    net.set(input, net.get(input));
    assert_eq!(net.pending(), 0);
}

#[test]
fn writing_the_current_level_of_a_floating_node_queues_nothing() {
    let mut c = Circuit::new();
    let input = c.node();
    let out = c.inverter(input);
    let mut net = c.build();
    net.stabilize();
    assert!(!net.get(input));

    net.set(input, net.get(input));
    assert_eq!(net.pending(), 0);
    assert_eq!(net.drive(input), Drive::Floating);
    net.recalc();
    assert!(net.get(out));
}

#[test]
fn inverter_chain_settles_by_parity() {
    let mut c = Circuit::new();
    let input = c.node();
    let mut stages = vec![input];
    for _ in 0..51 {
        let prev = *stages.last().unwrap();
        stages.push(c.inverter(prev));
    }
    let mut net = c.build();
    net.set(input, false);
    net.stabilize();
    for (i, &n) in stages.iter().enumerate() {
        assert_eq!(net.get(n), i % 2 == 1, "stage {i}");
    }

    net.set(input, true);
    net.recalc();
    for (i, &n) in stages.iter().enumerate() {
        assert_eq!(net.get(n), i % 2 == 0, "stage {i} after toggle");
    }
    assert_gates_consistent(&net);
}

#[test]
fn nor_latch_holds_state() {
    let mut c = Circuit::new();
    let s = c.node();
    let r = c.node();
    let q = c.pulled_up();
    let qn = c.pulled_up();
    c.transistor(r, q, GROUND);
    c.transistor(qn, q, GROUND);
    c.transistor(s, qn, GROUND);
    c.transistor(q, qn, GROUND);
    let mut net = c.build();
    net.set(s, false);
    net.set(r, false);
    net.stabilize();
    assert_ne!(net.get(q), net.get(qn));

    net.set(s, true);
    net.recalc();
    net.set(s, false);
    net.recalc();
    assert!(net.get(q));
    assert!(!net.get(qn));

    net.set(r, true);
    net.recalc();
    net.set(r, false);
    net.recalc();
    assert!(!net.get(q));
    assert!(net.get(qn));
    assert_gates_consistent(&net);
}

#[test]
fn isolated_node_retains_charge() {
    let mut c = Circuit::new();
    let pass = c.node();
    let source = c.node();
    let storage = c.node();
    c.transistor(pass, source, storage);
    let mut net = c.build();
    net.set(source, true);
    net.set(pass, true);
    net.stabilize();
    assert!(net.get(storage));

    net.set(pass, false);
    net.recalc();
    net.set(source, false);
    net.recalc();
    assert!(net.get(storage), "charge lost with the pass transistor off");

    net.set(pass, true);
    net.recalc();
    assert!(!net.get(storage));
}

#[test]
fn pulldown_anywhere_beats_pullup_in_same_group() {
    let mut c = Circuit::new();
    let pass = c.node();
    let up = c.pulled_up();
    let down = c.node();
    c.transistor(pass, up, down);
    let mut net = c.build();
    net.set(down, true);
    net.set(down, false);
    net.stabilize();
    assert_eq!(net.drive(down), Drive::PullDown);
    assert!(net.get(up));

    net.set(pass, true);
    net.recalc();
    assert!(!net.get(up));
    assert!(!net.get(down));
}

#[test]
fn nand_truth_table() {
    let mut c = Circuit::new();
    let a = c.node();
    let b = c.node();
    let out = c.pulled_up();
    let mid = c.node();
    c.transistor(a, out, mid);
    c.transistor(b, mid, GROUND);
    let mut net = c.build();
    net.stabilize();
    for (va, vb) in [(false, false), (false, true), (true, false), (true, true)] {
        net.set(a, va);
        net.set(b, vb);
        net.recalc();
        assert_eq!(net.get(out), !(va && vb), "a={va} b={vb}");
    }
}

#[test]
fn duplicate_definitions_collapse() {
    let mut c = Circuit::new();
    let a = c.node();
    let out = c.inverter(a);
    c.transistor(a, GROUND, out);
    c.transistor(a, out, GROUND);
    let net = c.build();
    assert_eq!(net.transistor_count(), 1);
}

#[test]
fn construction_rejects_out_of_range_nodes() {
    let mut c = Circuit::new();
    let a = c.node();
    c.transistor(a, 40, GROUND);
    let err = Network::new(&c.description()).unwrap_err();
    assert_eq!(
        err,
        NetworkError::NodeOutOfRange {
            index: 0,
            node: 40,
            node_count: 3
        }
    );
}

#[test]
fn bus_round_trip() {
    let mut c = Circuit::new();
    let ids: Vec<NodeId> = (0..12).map(|_| c.node()).collect();
    let mut net = c.build();
    net.stabilize();
    for v in [0, 1, 0x800, 0xA5A, 0x5A5, 0xFFF, 0x123] {
        net.write_bus(&ids, v);
        net.recalc();
        assert_eq!(net.read_bus(&ids), v);
    }
}

#[test]
fn identical_histories_give_identical_networks() {
    let mut c = Circuit::new();
    let s = c.node();
    let r = c.node();
    let q = c.nor(&[r]);
    let qn = c.nor(&[s, q]);
    c.transistor(qn, q, GROUND);
    let pass = c.node();
    let storage = c.node();
    c.transistor(pass, qn, storage);
    let buffered = c.inverter(storage);
    let inputs = [s, r, pass, buffered];

    let desc = c.description();
    let mut first = Network::new(&desc).unwrap();
    let mut second = Network::new(&desc).unwrap();
    first.stabilize();
    second.stabilize();
    assert_eq!(first.snapshot(), second.snapshot());

    let mut seed: u32 = 0x1234_5678;
    for step in 0..200 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let node = inputs[(seed >> 16) as usize % inputs.len()];
        let high = seed & 0x8000 != 0;
        for net in [&mut first, &mut second] {
            net.set(node, high);
            if step % 17 == 0 {
                net.stabilize();
            } else {
                net.recalc();
            }
        }
        assert_eq!(first.snapshot(), second.snapshot(), "diverged at step {step}");
        assert_gates_consistent(&first);
    }
}

/// Three inverters in a ring have no fixed point.
fn ring_oscillator(config: NetworkConfig) -> Network {
    let mut c = Circuit::new();
    let n0 = c.pulled_up();
    let n1 = c.inverter(n0);
    let n2 = c.inverter(n1);
    c.transistor(n2, n0, GROUND);
    Network::with_config(&c.description(), config).unwrap()
}

#[test]
fn oscillation_exhausts_the_settle_budget() {
    let mut net = ring_oscillator(NetworkConfig {
        settle_budget: Some(500),
    });
    assert_eq!(
        net.try_stabilize(),
        Err(NetworkError::Unsettled { budget: 500 })
    );
    assert!(net.is_settled());
}

#[test]
#[should_panic(expected = "did not settle")]
fn oscillation_panics_in_stabilize() {
    let mut net = ring_oscillator(NetworkConfig {
        settle_budget: Some(100),
    });
    net.stabilize();
}
