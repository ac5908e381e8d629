//! DOM queries: by id, class, type, predicate; hit-testing.

use super::node::{NodeData, NodeId};
use super::tree::Dom;
use crate::geometry::Offset;

impl Dom {
    /// Find the first node whose `id` field matches the given string.
    ///
    /// Iterates all nodes in the arena (not just the tree rooted at `root`).
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.iter_nodes()
            .find(|(_, data)| data.id.as_deref() == Some(id))
            .map(|(node_id, _)| node_id)
    }

    /// Find all nodes that have the given class.
    pub fn query_by_class(&self, class: &str) -> Vec<NodeId> {
        self.query_all(|data| data.has_class(class))
    }

    /// Find all nodes whose `widget_type` matches the given string.
    pub fn query_by_type(&self, widget_type: &str) -> Vec<NodeId> {
        self.query_all(|data| data.widget_type == widget_type)
    }

    /// Find all nodes matching an arbitrary predicate.
    pub fn query_all(&self, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.iter_nodes()
            .filter(|(_, data)| predicate(data))
            .map(|(node_id, _)| node_id)
            .collect()
    }

    /// The ordered stack of nodes under `point`, outermost first and
    /// innermost last.
    ///
    /// The innermost entry is the topmost node whose region contains the
    /// point, in paint order: a parent paints before its children and later
    /// siblings paint over earlier ones. The rest of the stack is that node's
    /// ancestor chain, whether or not their own regions contain the point, so
    /// region-less wrappers and overflowed parents are part of it. Hidden
    /// nodes hide their whole subtree.
    pub fn hover_stack(&self, point: Offset) -> Vec<NodeId> {
        let Some(topmost) = self.root().and_then(|root| self.topmost_hit(root, point)) else {
            return Vec::new();
        };
        let mut stack = self.ancestors_inclusive(topmost);
        stack.reverse();
        stack
    }

    /// The innermost node under `point` that can take focus, if any.
    pub fn focusable_at(&self, point: Offset) -> Option<NodeId> {
        self.hover_stack(point)
            .into_iter()
            .rev()
            .find(|&id| self.get(id).is_some_and(NodeData::can_focus))
    }

    /// Last node in paint order under `point` within the subtree of `id`.
    fn topmost_hit(&self, id: NodeId, point: Offset) -> Option<NodeId> {
        if !self.get(id).is_some_and(|data| data.visible) {
            return None;
        }
        self.children(id)
            .iter()
            .rev()
            .find_map(|&child| self.topmost_hit(child, point))
            .or_else(|| self.is_hit(id, point).then_some(id))
    }

    fn is_hit(&self, id: NodeId, point: Offset) -> bool {
        self.get(id).is_some_and(|data| {
            data.visible && data.region.is_some_and(|region| region.contains(point))
        })
    }

    /// Iterate over all `(NodeId, &NodeData)` pairs in the arena.
    ///
    /// Iterates in slotmap insertion order, which is deterministic but not
    /// tree-order.
    fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes.iter()
    }
}
