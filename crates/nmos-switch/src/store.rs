//! Node and transistor arena.
//!
//! Built once from a [`NetworkDescription`]. Afterwards only drive flags,
//! node values and transistor states change; adjacency never does.

use std::collections::HashSet;

use crate::error::{NetworkError, Result};
use crate::{NetworkDescription, NodeId, TransistorDef, TransistorId};

/// External bias applied to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    /// Neither pulled up nor pulled down.
    Floating,
    PullUp,
    PullDown,
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub pullup: bool,
    pub pulldown: bool,
    /// Last resolved level.
    pub value: bool,
    /// Transistors this node is the gate of.
    pub gates: Vec<TransistorId>,
    /// Transistors this node is a channel terminal of.
    pub legs: Vec<TransistorId>,
}

impl Node {
    fn new(pullup: bool) -> Self {
        Self {
            pullup,
            pulldown: false,
            value: false,
            gates: Vec::new(),
            legs: Vec::new(),
        }
    }

    pub fn drive(&self) -> Drive {
        match (self.pullup, self.pulldown) {
            (true, _) => Drive::PullUp,
            (false, true) => Drive::PullDown,
            (false, false) => Drive::Floating,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Transistor {
    pub gate: NodeId,
    pub c1: NodeId,
    pub c2: NodeId,
    /// Mirrors the gate's value once the network is settled.
    pub on: bool,
    /// Terminal to re-evaluate when this transistor turns on: the one that
    /// is not a sentinel, or `c1` when neither is.
    pub settle_target: NodeId,
}

impl Transistor {
    /// The terminal across the channel from `node`.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.c1 == node { self.c2 } else { self.c1 }
    }

    pub fn def(&self) -> TransistorDef {
        TransistorDef::new(self.gate, self.c1, self.c2)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Store {
    pub nodes: Vec<Node>,
    pub transistors: Vec<Transistor>,
    pub power: NodeId,
    pub ground: NodeId,
}

impl Store {
    pub fn build(desc: &NetworkDescription) -> Result<Self> {
        let node_count = desc.node_count();
        for (role, node) in [("power", desc.power), ("ground", desc.ground)] {
            if node >= node_count {
                return Err(NetworkError::SentinelOutOfRange {
                    role,
                    node,
                    node_count,
                });
            }
        }
        if desc.power == desc.ground {
            return Err(NetworkError::SentinelsCoincide(desc.power));
        }

        let mut nodes: Vec<Node> = desc.pullups.iter().map(|&p| Node::new(p)).collect();
        nodes[desc.power].value = true;

        let is_sentinel = |id: NodeId| id == desc.power || id == desc.ground;
        let mut seen = HashSet::with_capacity(desc.transistors.len());
        let mut transistors = Vec::with_capacity(desc.transistors.len());

        for (index, def) in desc.transistors.iter().enumerate() {
            if let Some(&node) = [def.gate, def.c1, def.c2]
                .iter()
                .find(|&&n| n >= node_count)
            {
                return Err(NetworkError::NodeOutOfRange {
                    index,
                    node,
                    node_count,
                });
            }
            if !seen.insert(def.key()) {
                continue;
            }

            let id = transistors.len();
            nodes[def.gate].gates.push(id);
            // Group fills stop at the rails, so only ordinary nodes need legs.
            if !is_sentinel(def.c1) {
                nodes[def.c1].legs.push(id);
            }
            if def.c2 != def.c1 && !is_sentinel(def.c2) {
                nodes[def.c2].legs.push(id);
            }
            transistors.push(Transistor {
                gate: def.gate,
                c1: def.c1,
                c2: def.c2,
                on: nodes[def.gate].value,
                settle_target: if is_sentinel(def.c1) { def.c2 } else { def.c1 },
            });
        }

        log::debug!(
            "built network: {} nodes, {} transistors ({} duplicates collapsed)",
            node_count,
            transistors.len(),
            desc.transistors.len() - transistors.len()
        );

        Ok(Self {
            nodes,
            transistors,
            power: desc.power,
            ground: desc.ground,
        })
    }

    pub fn is_sentinel(&self, id: NodeId) -> bool {
        id == self.power || id == self.ground
    }
}
