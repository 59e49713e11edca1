//! Expansion and selection state for the interactive proof map.
//!
//! Only user clicks mutate a [`MapState`]. Expansion is per node; selection
//! is a single node across the whole tree and independent of expansion.

use serde::Serialize;
use std::collections::HashSet;

use crate::math::{segment, Segment};
use crate::tree::{LogicNode, NodeType};

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The node had children and is now expanded.
    Expanded,
    /// The node had children and is now collapsed.
    Collapsed,
    /// The node has no children; only the selection changed.
    Selected,
}

/// A node reachable through expanded ancestors.
#[derive(Debug, Clone, Copy)]
pub struct VisibleNode<'a> {
    /// The node itself
    pub node: &'a LogicNode,
    /// Root is depth 0.
    pub depth: usize,
    /// Whether its children are shown
    pub expanded: bool,
}

/// Display-ready view of one node, every text field segmented.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCard {
    /// Node id
    pub id: String,
    /// Structural role
    pub node_type: NodeType,
    /// Segmented statement
    pub statement: Vec<Segment>,
    /// Segmented method, if any
    pub method: Option<Vec<Segment>>,
    /// Segmented rationale, if any
    pub reason: Option<Vec<Segment>>,
    /// Proven flag as reported by the model
    pub is_proven: bool,
    /// Number of direct children
    pub child_count: usize,
}

/// Per-tree view state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapState {
    expanded: HashSet<String>,
    selected: Option<String>,
}

impl MapState {
    /// Fresh state for a tree: root expanded, nothing selected
    pub fn new(root: &LogicNode) -> Self {
        let mut expanded = HashSet::new();
        expanded.insert(root.id.clone());
        Self {
            expanded,
            selected: None,
        }
    }

    /// Handle a click: toggle expansion when the node has children, always select it
    pub fn click(&mut self, node: &LogicNode) -> ClickOutcome {
        self.selected = Some(node.id.clone());

        if node.is_terminal() {
            return ClickOutcome::Selected;
        }

        if self.expanded.remove(&node.id) {
            ClickOutcome::Collapsed
        } else {
            self.expanded.insert(node.id.clone());
            ClickOutcome::Expanded
        }
    }

    /// Whether the node with this id is expanded
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Id of the selected node, if any
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected node within `root`
    pub fn selected_node<'a>(&self, root: &'a LogicNode) -> Option<&'a LogicNode> {
        self.selected.as_deref().and_then(|id| root.find(id))
    }

    /// Pre-order list of nodes whose ancestors are all expanded
    pub fn visible_nodes<'a>(&self, root: &'a LogicNode) -> Vec<VisibleNode<'a>> {
        let mut visible = Vec::new();
        self.collect_visible(root, 0, &mut visible);
        visible
    }

    fn collect_visible<'a>(
        &self,
        node: &'a LogicNode,
        depth: usize,
        visible: &mut Vec<VisibleNode<'a>>,
    ) {
        let expanded = self.is_expanded(&node.id);
        visible.push(VisibleNode {
            node,
            depth,
            expanded,
        });
        if expanded {
            for child in &node.children {
                self.collect_visible(child, depth + 1, visible);
            }
        }
    }
}

/// Segment a node's text fields for display
pub fn node_card(node: &LogicNode) -> NodeCard {
    NodeCard {
        id: node.id.clone(),
        node_type: node.node_type,
        statement: segment(&node.statement),
        method: node.method.as_deref().map(segment),
        reason: node.reason.as_deref().map(segment),
        is_proven: node.is_proven,
        child_count: node.children.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> LogicNode {
        LogicNode {
            id: id.to_string(),
            statement: format!("fact {}", id),
            method: None,
            reason: None,
            node_type: NodeType::Leaf,
            children: vec![],
            is_proven: true,
        }
    }

    fn tree() -> LogicNode {
        let mut step = leaf("step");
        step.node_type = NodeType::Node;
        step.children = vec![leaf("h1"), leaf("h2")];

        let mut root = leaf("root");
        root.node_type = NodeType::Root;
        root.children = vec![step, leaf("h3")];
        root
    }

    fn ids(state: &MapState, root: &LogicNode) -> Vec<String> {
        state
            .visible_nodes(root)
            .iter()
            .map(|v| v.node.id.clone())
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let root = tree();
        let state = MapState::new(&root);
        assert!(state.is_expanded("root"));
        assert!(!state.is_expanded("step"));
        assert!(state.selected().is_none());
        assert_eq!(ids(&state, &root), vec!["root", "step", "h3"]);
    }

    #[test]
    fn test_click_toggles_and_selects() {
        let root = tree();
        let mut state = MapState::new(&root);
        let step = root.find("step").unwrap();

        assert_eq!(state.click(step), ClickOutcome::Expanded);
        assert_eq!(state.selected(), Some("step"));
        assert_eq!(ids(&state, &root), vec!["root", "step", "h1", "h2", "h3"]);

        let depths: Vec<usize> = state.visible_nodes(&root).iter().map(|v| v.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 2, 1]);

        assert_eq!(state.click(step), ClickOutcome::Collapsed);
        assert_eq!(ids(&state, &root), vec!["root", "step", "h3"]);
    }

    #[test]
    fn test_click_on_leaf_only_selects() {
        let root = tree();
        let mut state = MapState::new(&root);
        let h3 = root.find("h3").unwrap();

        assert_eq!(state.click(h3), ClickOutcome::Selected);
        assert!(!state.is_expanded("h3"));
        assert_eq!(state.selected_node(&root).map(|n| n.id.as_str()), Some("h3"));
    }

    #[test]
    fn test_selection_is_independent_of_expansion() {
        let root = tree();
        let mut state = MapState::new(&root);
        let step = root.find("step").unwrap();
        state.click(step);
        state.click(&root);

        assert_eq!(state.selected(), Some("root"));
        assert!(!state.is_expanded("root"));
        assert!(state.is_expanded("step"));
        assert_eq!(ids(&state, &root), vec!["root"]);
    }

    #[test]
    fn test_node_card_segments_fields() {
        let mut node = leaf("n");
        node.statement = "Since $AB = AC$".to_string();
        node.method = Some("**SSS**".to_string());

        let card = node_card(&node);
        assert_eq!(card.statement.len(), 2);
        assert!(card.statement[1].is_math());
        assert!(matches!(
            card.method.as_deref(),
            Some([Segment::Bold { .. }])
        ));
        assert!(card.reason.is_none());
    }
}
