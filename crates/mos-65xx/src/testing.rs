//! A tiny stand-in die carrying every node name the facade resolves.
//!
//! Most nodes are free-floating, so tests can drive register and bus bits
//! directly. A little logic is wired in: `clk1out` inverts `clk0`,
//! `clk2out` inverts `clk1out`, and each `notir` bit inverts the matching
//! data bus bit.

use nmos_switch::{NetworkDescription, NodeId, TransistorDef};

use crate::{Mos65xx, Netlist};

const POWER: NodeId = 0;
const GROUND: NodeId = 1;

struct Builder {
    pullups: Vec<bool>,
    transistors: Vec<TransistorDef>,
    names: Vec<(String, NodeId)>,
}

impl Builder {
    fn node(&mut self, name: impl Into<String>, pullup: bool) -> NodeId {
        let id = self.pullups.len();
        self.pullups.push(pullup);
        self.names.push((name.into(), id));
        id
    }

    fn inverter(&mut self, name: impl Into<String>, input: NodeId) -> NodeId {
        let out = self.node(name, true);
        self.transistors.push(TransistorDef::new(input, out, GROUND));
        out
    }
}

#[must_use]
pub fn synthetic_netlist() -> Netlist {
    let mut b = Builder {
        pullups: vec![false, false],
        transistors: Vec::new(),
        names: vec![("vcc".into(), POWER), ("vss".into(), GROUND)],
    };

    for name in ["res", "rdy", "irq", "nmi", "so", "sync", "rw"] {
        b.node(name, false);
    }
    let clk0 = b.node("clk0", false);
    let clk1out = b.inverter("clk1out", clk0);
    b.inverter("clk2out", clk1out);

    for bit in 0..16 {
        b.node(format!("ab{bit}"), false);
    }
    for bit in 0..8 {
        let db = b.node(format!("db{bit}"), false);
        b.inverter(format!("notir{bit}"), db);
    }
    for prefix in ["a", "x", "y", "s", "pcl", "pch"] {
        for bit in 0..8 {
            b.node(format!("{prefix}{bit}"), false);
        }
    }
    for bit in [0, 1, 2, 3, 4, 6, 7] {
        b.node(format!("p{bit}"), false);
    }

    Netlist::new(
        NetworkDescription {
            pullups: b.pullups,
            transistors: b.transistors,
            power: POWER,
            ground: GROUND,
        },
        b.names,
    )
}

/// Put one bus cycle on the synthetic die's pins: address, R/W and data,
/// then propagate.
pub fn drive_cycle(chip: &mut Mos65xx, address: u16, read: bool, data: u8) {
    let nodes = chip.nodes().clone();
    let net = chip.network_mut();
    net.write_bus(&nodes.address_bus, address.into());
    net.set(nodes.rw, read);
    net.write_bus(&nodes.data_bus, data.into());
    chip.recalc();
}
