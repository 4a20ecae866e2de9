//! Flood fill over conducting transistors and group value resolution.

use crate::store::Store;
use crate::{ChangeQueue, NodeId};

/// Strongest influence found in a group so far.
///
/// Ordered weakest to strongest, so the resolved value is the maximum over
/// every member and sentinel reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupValue {
    /// Fully floating and never charged.
    Nothing,
    /// Floating, but some member still holds a high charge.
    High,
    PullUp,
    PullDown,
    /// Connected to the power rail.
    Power,
    /// Connected to ground.
    Ground,
}

impl GroupValue {
    /// Logical level the group settles to.
    #[must_use]
    pub const fn level(self) -> bool {
        match self {
            GroupValue::Power | GroupValue::PullUp | GroupValue::High => true,
            GroupValue::Ground | GroupValue::PullDown | GroupValue::Nothing => false,
        }
    }
}

/// Scratch state for computing one group at a time.
///
/// Owns the per-node `in_group` flags. The member list and the fill stack
/// are both growable, so no fan-out can overflow them.
#[derive(Debug, Clone, Default)]
pub(crate) struct GroupResolver {
    members: Vec<NodeId>,
    in_group: Vec<bool>,
    stack: Vec<NodeId>,
}

impl GroupResolver {
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            members: Vec::new(),
            in_group: vec![false; node_count],
            stack: Vec::new(),
        }
    }

    /// Nodes of the group computed by the last [`resolve`](Self::resolve).
    #[must_use]
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    #[cfg(test)]
    pub fn contains(&self, id: NodeId) -> bool {
        self.in_group.get(id).copied().unwrap_or(false)
    }

    /// Collect the group containing `seed` and resolve its value.
    ///
    /// Every member has its pending mark cleared in `queue`: resolving the
    /// group settles all of them at once.
    pub(crate) fn resolve(
        &mut self,
        store: &Store,
        queue: &mut ChangeQueue,
        seed: NodeId,
    ) -> GroupValue {
        self.release();

        let mut value = GroupValue::Nothing;
        self.stack.push(seed);

        while let Some(id) = self.stack.pop() {
            if id == store.ground {
                value = GroupValue::Ground;
                continue;
            }
            if id == store.power {
                value = value.max(GroupValue::Power);
                continue;
            }
            if self.in_group[id] {
                continue;
            }
            self.in_group[id] = true;
            self.members.push(id);
            queue.unmark(id);

            let node = &store.nodes[id];
            if node.pulldown {
                value = value.max(GroupValue::PullDown);
            } else if node.pullup {
                value = value.max(GroupValue::PullUp);
            } else if node.value {
                value = value.max(GroupValue::High);
            }

            for &t in &node.legs {
                let transistor = &store.transistors[t];
                if transistor.on {
                    self.stack.push(transistor.other(id));
                }
            }
        }

        value
    }

    /// Forget the last group, clearing the membership flags it set.
    pub fn release(&mut self) {
        for &id in &self.members {
            self.in_group[id] = false;
        }
        self.members.clear();
        self.stack.clear();
    }
}
