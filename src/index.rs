//! View index: the arena that owns every node of one layout

use indexmap::IndexMap;

use crate::host::WidgetId;
use crate::node::{AppliedConstraint, ViewNode};
use crate::parser::RawConstraint;

/// Every node of a layout keyed by id, in insertion order
#[derive(Debug, Clone, Default)]
pub struct ViewIndex {
    nodes: IndexMap<String, ViewNode>,
}

impl ViewIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Add a node. An existing entry with the same id is kept and `false` is returned.
    pub fn insert(&mut self, node: ViewNode) -> bool {
        if self.nodes.contains_key(node.id()) {
            return false;
        }
        self.nodes.insert(node.id().to_string(), node);
        true
    }

    pub fn get(&self, id: &str) -> Option<&ViewNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ViewNode> {
        self.nodes.get_mut(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewNode> + '_ {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ViewNode> + '_ {
        self.nodes.values_mut()
    }

    pub fn active(&self) -> impl Iterator<Item = &ViewNode> + '_ {
        self.nodes.values().filter(|node| node.is_active())
    }

    /// The active root node. A root renamed by a later build stays behind inactive.
    pub fn root(&self) -> Option<&ViewNode> {
        self.nodes
            .values()
            .find(|node| node.is_root() && node.is_active())
    }

    pub fn root_target(&self) -> Option<WidgetId> {
        self.root().and_then(ViewNode::target)
    }

    /// Live widget of the node with this id
    pub fn target_of(&self, id: &str) -> Option<WidgetId> {
        self.get(id).and_then(ViewNode::target)
    }

    /// Nodes ordered by parent id, then ascending z-index; ties keep insertion order
    pub fn by_z_order(&self) -> Vec<&ViewNode> {
        let mut nodes: Vec<&ViewNode> = self.nodes.values().collect();
        nodes.sort_by(|a, b| {
            a.parent()
                .cmp(&b.parent())
                .then_with(|| a.z_index().cmp(&b.z_index()))
        });
        nodes
    }

    /// Children of `parent` in stacking order
    pub fn children_of(&self, parent: &str) -> Vec<&ViewNode> {
        self.by_z_order()
            .into_iter()
            .filter(|node| node.parent() == Some(parent))
            .collect()
    }

    /// Every raw constraint affecting an active node, tagged with the node id
    pub fn affecting_constraints(&self) -> Vec<(&str, &RawConstraint)> {
        self.active()
            .flat_map(|node| node.affecting_constraints().map(move |c| (node.id(), c)))
            .collect()
    }

    /// Installed relations carrying `identifier`, across all nodes
    pub fn applied_constraints_with_identifier(&self, identifier: &str) -> Vec<&AppliedConstraint> {
        self.nodes
            .values()
            .flat_map(|node| node.applied_constraints())
            .filter(|c| c.identifier.as_deref() == Some(identifier))
            .collect()
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;
    use crate::parser::RawNode;
    use crate::stylesheet::Palette;

    fn node(raw: &str, parent: Option<&str>, z: i32) -> ViewNode {
        ViewNode::new(
            RawNode::new(raw).with_z_index(z),
            parent.map(str::to_string),
            parent.is_none(),
        )
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut index = ViewIndex::new();
        assert!(index.insert(node("!box", Some("root"), 1)));
        assert!(!index.insert(node("box", Some("root"), 7)));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("box").map(ViewNode::z_index), Some(1));
    }

    #[test]
    fn test_root_lookup() {
        let mut index = ViewIndex::new();
        index.insert(node("root", None, 0));
        index.insert(node("!a", Some("root"), 0));
        assert_eq!(index.root().map(ViewNode::id), Some("root"));
    }

    #[test]
    fn test_inactive_root_is_skipped() {
        let mut index = ViewIndex::new();
        index.insert(node("root", None, 0));
        index.insert(node("main", None, 0));
        let mut host = HeadlessHost::new();
        index
            .get_mut("root")
            .unwrap()
            .remove(&mut host, &Palette::default());
        assert_eq!(index.root().map(ViewNode::id), Some("main"));
    }

    #[test]
    fn test_z_order_within_parent() {
        let mut index = ViewIndex::new();
        index.insert(node("root", None, 0));
        index.insert(node("!top", Some("root"), 5));
        index.insert(node("!bottom", Some("root"), -1));
        index.insert(node("!middle", Some("root"), 2));
        index.insert(node("!tie", Some("root"), 2));
        let order: Vec<_> = index.children_of("root").into_iter().map(ViewNode::id).collect();
        assert_eq!(order, ["bottom", "middle", "tie", "top"]);
        assert_eq!(index.by_z_order()[0].id(), "root");
    }
}
