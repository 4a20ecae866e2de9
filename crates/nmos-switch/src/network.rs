//! The network engine: node get/set, bus helpers and fixed-point drains.

use crate::error::{NetworkError, Result};
use crate::store::{Drive, Store};
use crate::{ChangeQueue, GroupResolver, NetworkDescription, NodeId, TransistorDef, TransistorId};

/// Group evaluations allowed per node before a drain is declared unsettled.
const SETTLE_BUDGET_PER_NODE: usize = 256;

/// Lower bound on the settle budget, so tiny networks are not starved.
const MIN_SETTLE_BUDGET: usize = 1024;

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkConfig {
    /// Maximum number of group evaluations in one drain. `None` scales with
    /// the network: 256 per node, at least 1024.
    pub settle_budget: Option<usize>,
}

impl NetworkConfig {
    fn budget_for(self, node_count: usize) -> usize {
        self.settle_budget.unwrap_or_else(|| {
            node_count
                .saturating_mul(SETTLE_BUDGET_PER_NODE)
                .max(MIN_SETTLE_BUDGET)
        })
    }
}

/// A switch-level NMOS network.
///
/// Between public calls the network is always settled: every pending
/// perturbation has been propagated to a fixed point, except for `set`
/// calls not yet followed by [`recalc`](Self::recalc).
#[derive(Debug, Clone)]
pub struct Network {
    store: Store,
    queue: ChangeQueue,
    group: GroupResolver,
    /// Nodes disturbed by the node currently toggling, before ordering.
    disturbed: Vec<NodeId>,
    settle_budget: usize,
}

impl Network {
    pub fn new(desc: &NetworkDescription) -> Result<Self> {
        Self::with_config(desc, NetworkConfig::default())
    }

    pub fn with_config(desc: &NetworkDescription, config: NetworkConfig) -> Result<Self> {
        let store = Store::build(desc)?;
        let node_count = store.nodes.len();
        Ok(Self {
            store,
            queue: ChangeQueue::new(node_count),
            group: GroupResolver::new(node_count),
            disturbed: Vec::new(),
            settle_budget: config.budget_for(node_count),
        })
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.store.nodes.len()
    }

    /// Number of distinct transistors, after duplicates collapsed.
    #[must_use]
    pub fn transistor_count(&self) -> usize {
        self.store.transistors.len()
    }

    #[must_use]
    pub fn power(&self) -> NodeId {
        self.store.power
    }

    #[must_use]
    pub fn ground(&self) -> NodeId {
        self.store.ground
    }

    #[must_use]
    pub fn is_sentinel(&self, id: NodeId) -> bool {
        self.store.is_sentinel(id)
    }

    /// Resolved level of a node; false for ids outside the network.
    #[must_use]
    pub fn get(&self, id: NodeId) -> bool {
        self.store.nodes.get(id).is_some_and(|n| n.value)
    }

    /// Current drive of a node; `Floating` for ids outside the network.
    #[must_use]
    pub fn drive(&self, id: NodeId) -> Drive {
        self.store.nodes.get(id).map_or(Drive::Floating, |n| n.drive())
    }

    /// Drive a node high (pull-up) or low (pull-down).
    ///
    /// Only a pulled-up node can be driven low: a floating node already
    /// reads low and is left floating. The node is queued only if its drive
    /// actually changes. Sentinels and ids outside the network are ignored.
    /// Takes effect at the next [`recalc`](Self::recalc).
    pub fn set(&mut self, id: NodeId, high: bool) {
        if self.store.is_sentinel(id) {
            return;
        }
        let Some(node) = self.store.nodes.get_mut(id) else {
            return;
        };
        if node.pullup == high {
            return;
        }
        node.pullup = high;
        node.pulldown = !high;
        self.queue.push(id);
    }

    /// Number of nodes waiting for the next drain.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.queue.is_empty()
    }

    /// Every node's resolved level, indexed by id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<bool> {
        self.store.nodes.iter().map(|n| n.value).collect()
    }

    /// Endpoints and conduction state of one transistor.
    #[must_use]
    pub fn transistor(&self, id: TransistorId) -> Option<(TransistorDef, bool)> {
        self.store.transistors.get(id).map(|t| (t.def(), t.on))
    }

    /// Pack node levels into an integer, first id most significant.
    ///
    /// Ids outside the network read as 0 bits.
    #[must_use]
    pub fn read_bus(&self, ids: &[NodeId]) -> u32 {
        ids.iter()
            .fold(0, |acc, &id| (acc << 1) | u32::from(self.get(id)))
    }

    /// Drive each listed node from one bit of `value`: the last id gets bit
    /// 0, the first id the highest bit. The inverse of
    /// [`read_bus`](Self::read_bus).
    pub fn write_bus(&mut self, ids: &[NodeId], mut value: u32) {
        for &id in ids.iter().rev() {
            self.set(id, value & 1 != 0);
            value >>= 1;
        }
    }

    /// Queue every node and drain to a fixed point, recomputing the whole
    /// network independent of history.
    ///
    /// # Panics
    ///
    /// If the network does not settle within its budget.
    pub fn stabilize(&mut self) {
        if let Err(err) = self.try_stabilize() {
            panic!("{err}");
        }
    }

    /// Drain pending nodes to a fixed point.
    ///
    /// # Panics
    ///
    /// If the network does not settle within its budget.
    pub fn recalc(&mut self) {
        if let Err(err) = self.try_recalc() {
            panic!("{err}");
        }
    }

    /// [`stabilize`](Self::stabilize), reporting an oscillating network as
    /// an error. On error the queue is cleared and node values are whatever
    /// the drain last wrote.
    pub fn try_stabilize(&mut self) -> Result<()> {
        for id in 0..self.store.nodes.len() {
            if !self.store.is_sentinel(id) {
                self.queue.push(id);
            }
        }
        self.drain()
    }

    /// [`recalc`](Self::recalc), reporting an oscillating network as an
    /// error. On error the queue is cleared.
    pub fn try_recalc(&mut self) -> Result<()> {
        self.drain()
    }

    fn drain(&mut self) -> Result<()> {
        let mut evaluations = 0;
        while let Some(id) = self.queue.pop() {
            if evaluations == self.settle_budget {
                self.queue.clear();
                log::error!(
                    "network unsettled after {evaluations} group evaluations, dropping pending nodes"
                );
                return Err(NetworkError::Unsettled {
                    budget: self.settle_budget,
                });
            }
            evaluations += 1;
            self.recalc_group(id);
        }
        log::trace!("network settled after {evaluations} group evaluations");
        Ok(())
    }

    /// Resolve the group of `seed` and propagate every level change out
    /// through the transistors the changed nodes gate.
    fn recalc_group(&mut self, seed: NodeId) {
        let level = self.group.resolve(&self.store, &mut self.queue, seed).level();

        for &id in self.group.members() {
            if self.store.nodes[id].value == level {
                continue;
            }
            self.store.nodes[id].value = level;

            self.disturbed.clear();
            for &t in &self.store.nodes[id].gates {
                let transistor = &mut self.store.transistors[t];
                transistor.on = level;
                let (c1, c2) = (transistor.c1, transistor.c2);
                if level {
                    // Turning on merges two nets; nothing moves if they agree.
                    if self.store.nodes[c1].value != self.store.nodes[c2].value {
                        self.disturbed.push(transistor.settle_target);
                    }
                } else {
                    // Turning off may isolate either side.
                    self.disturbed.push(c1);
                    self.disturbed.push(c2);
                }
            }

            self.disturbed.sort_unstable();
            self.disturbed.dedup();
            for &n in &self.disturbed {
                if !self.store.is_sentinel(n) {
                    self.queue.push(n);
                }
            }
        }

        self.group.release();
    }
}
