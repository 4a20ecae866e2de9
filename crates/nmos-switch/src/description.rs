//! Immutable construction-time description of a transistor network.

/// Dense index of a node.
pub type NodeId = usize;

/// Dense index of a transistor, after duplicate definitions are collapsed.
pub type TransistorId = usize;

/// One pass transistor: `gate` controls conduction between `c1` and `c2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransistorDef {
    pub gate: NodeId,
    pub c1: NodeId,
    pub c2: NodeId,
}

impl TransistorDef {
    #[must_use]
    pub const fn new(gate: NodeId, c1: NodeId, c2: NodeId) -> Self {
        Self { gate, c1, c2 }
    }

    /// True if both definitions describe the same physical device: same
    /// gate, same terminals in either order.
    #[must_use]
    pub fn same_device(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Order-independent identity used to collapse duplicates.
    pub(crate) fn key(&self) -> (NodeId, NodeId, NodeId) {
        (self.gate, self.c1.min(self.c2), self.c1.max(self.c2))
    }
}

impl From<(NodeId, NodeId, NodeId)> for TransistorDef {
    fn from((gate, c1, c2): (NodeId, NodeId, NodeId)) -> Self {
        Self::new(gate, c1, c2)
    }
}

/// The static netlist a [`Network`](crate::Network) is built from.
///
/// Node ids are `0..pullups.len()`. `power` and `ground` must be two
/// distinct ids inside that range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkDescription {
    /// Structural pull-up flag of every node.
    pub pullups: Vec<bool>,
    /// Transistor definitions; duplicates are allowed and collapse.
    pub transistors: Vec<TransistorDef>,
    /// The node fixed high.
    pub power: NodeId,
    /// The node fixed low.
    pub ground: NodeId,
}

impl NetworkDescription {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.pullups.len()
    }
}
