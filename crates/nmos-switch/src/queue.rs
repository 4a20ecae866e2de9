//! Deduplicating FIFO of nodes awaiting re-evaluation.

use std::collections::VecDeque;

use crate::NodeId;

/// FIFO of pending nodes with O(1) membership.
///
/// A node is *pending* while its mark is set. Pushing a pending node is a
/// no-op. A mark can be cleared without removing the entry (the group
/// resolver does this for every node it absorbs); such stale entries are
/// skipped by [`pop`](Self::pop). If the node is pushed again before its
/// stale entry is reached, the older entry serves it. The backing deque
/// grows as needed.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChangeQueue {
    entries: VecDeque<NodeId>,
    marked: Vec<bool>,
    marked_count: usize,
}

impl ChangeQueue {
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(node_count),
            marked: vec![false; node_count],
            marked_count: 0,
        }
    }

    /// Mark `id` pending and append it, unless it is already pending.
    /// Ids outside the node range are ignored.
    pub fn push(&mut self, id: NodeId) {
        match self.marked.get_mut(id) {
            Some(mark) if !*mark => {
                *mark = true;
                self.marked_count += 1;
                self.entries.push_back(id);
            }
            _ => {}
        }
    }

    /// Remove and return the oldest pending node, clearing its mark.
    pub fn pop(&mut self) -> Option<NodeId> {
        while let Some(id) = self.entries.pop_front() {
            if self.unmark(id) {
                return Some(id);
            }
        }
        None
    }

    /// Clear the pending mark of `id`. Returns whether it was pending.
    pub fn unmark(&mut self, id: NodeId) -> bool {
        match self.marked.get_mut(id) {
            Some(mark) if *mark => {
                *mark = false;
                self.marked_count -= 1;
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn is_marked(&self, id: NodeId) -> bool {
        self.marked.get(id).copied().unwrap_or(false)
    }

    /// Number of pending nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.marked_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marked_count == 0
    }

    /// Drop every entry and mark.
    pub fn clear(&mut self) {
        while let Some(id) = self.entries.pop_front() {
            self.unmark(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_without_duplicates() {
        let mut q = ChangeQueue::new(8);
        for id in [3, 1, 3, 5, 1] {
            q.push(id);
        }
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop(), Some(3));
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(5));
        assert_eq!(q.pop(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn unmarked_entries_are_skipped() {
        let mut q = ChangeQueue::new(8);
        q.push(2);
        q.push(4);
        assert!(q.unmark(2));
        assert!(!q.unmark(2));
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop(), Some(4));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn repush_after_unmark_is_processed_once() {
        let mut q = ChangeQueue::new(8);
        q.push(2);
        q.unmark(2);
        q.push(2);
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn grows_past_node_count() {
        let mut q = ChangeQueue::new(4);
        for round in 0..1000 {
            q.push(round % 4);
            q.unmark(round % 4);
        }
        q.push(1);
        assert_eq!(q.pop(), Some(1));
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut q = ChangeQueue::new(2);
        q.push(7);
        assert!(q.is_empty());
        assert!(!q.is_marked(7));
    }

    #[test]
    fn clear_resets_marks() {
        let mut q = ChangeQueue::new(4);
        q.push(0);
        q.push(3);
        q.clear();
        assert!(q.is_empty());
        assert!(!q.is_marked(3));
        q.push(3);
        assert_eq!(q.pop(), Some(3));
    }
}
