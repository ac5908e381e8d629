//! Tab-order focus chain.
//!
//! [`FocusChain`] maintains the tab order of focusable, visible, non-disabled
//! nodes. It only answers "what comes next"; which node actually holds focus
//! is the document's business.

use super::node::{NodeData, NodeId};
use super::tree::Dom;

/// Ordered list of focusable nodes for tab navigation.
///
/// The chain is rebuilt from the DOM whenever the tree changes. Navigation
/// cycles through the chain in forward (Tab) or backward (BackTab) order.
#[derive(Debug, Default)]
pub struct FocusChain {
    /// Focusable nodes in tab order (depth-first).
    nodes: Vec<NodeId>,
}

impl FocusChain {
    /// Create a new, empty focus chain.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Rebuild the chain from the DOM, depth-first from the root.
    pub fn rebuild(&mut self, dom: &Dom) {
        self.nodes.clear();
        let Some(root) = dom.root() else {
            return;
        };
        self.nodes.extend(
            dom.walk_depth_first(root)
                .into_iter()
                .filter(|&id| dom.get(id).is_some_and(NodeData::can_focus)),
        );
    }

    /// The node after `current` in tab order, wrapping around.
    ///
    /// With no current node (or one not in the chain) the first node is
    /// returned. `None` only if the chain is empty.
    pub fn next_after(&self, current: Option<NodeId>) -> Option<NodeId> {
        if self.nodes.is_empty() {
            return None;
        }
        let next = match current.and_then(|id| self.position(id)) {
            Some(idx) => (idx + 1) % self.nodes.len(),
            None => 0,
        };
        self.nodes.get(next).copied()
    }

    /// The node before `current` in tab order, wrapping around.
    ///
    /// With no current node (or one not in the chain) the last node is
    /// returned. `None` only if the chain is empty.
    pub fn previous_before(&self, current: Option<NodeId>) -> Option<NodeId> {
        if self.nodes.is_empty() {
            return None;
        }
        let prev = match current.and_then(|id| self.position(id)) {
            Some(0) | None => self.nodes.len() - 1,
            Some(idx) => idx - 1,
        };
        self.nodes.get(prev).copied()
    }

    /// Whether `id` is in the chain.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Nodes in tab order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of focusable nodes in the chain.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn position(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|&n| n == id)
    }
}
