//! Backward-reasoning proof trees and the answer model built around them.
//!
//! Every value in this module is produced by the [`sanitize`] functions from
//! untrusted model output, so consumers can rely on the invariants documented
//! on each type without re-validating.

mod sanitize;

pub use sanitize::*;

use serde::{Deserialize, Serialize};

/// Position of a node in a backward-reasoning tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    /// The conclusion being proven.
    Root,
    /// An intermediate deduction.
    #[default]
    Node,
    /// A hypothesis, axiom or terminal fact.
    Leaf,
}

impl NodeType {
    /// Get the type name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Root => "ROOT",
            NodeType::Node => "NODE",
            NodeType::Leaf => "LEAF",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in a backward-reasoning proof tree.
///
/// Children are sub-goals that together establish the parent's statement.
/// Children are owned by their parent alone, so the structure is a strict tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicNode {
    /// Identifier, unique within the tree.
    pub id: String,
    /// The claim established at this node; never empty.
    pub statement: String,
    /// Theorem or technique justifying the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Free-text rationale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Structural role
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Premises this node is derived from
    #[serde(default)]
    pub children: Vec<LogicNode>,
    /// Informational only.
    #[serde(rename = "isProven", default)]
    pub is_proven: bool,
}

impl LogicNode {
    /// True when the node has no sub-goals, whatever its declared type.
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(LogicNode::node_count).sum::<usize>()
    }

    /// Depth of this subtree; a lone node has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(LogicNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order search by id.
    pub fn find(&self, id: &str) -> Option<&LogicNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Outcome the model reports for a reasoning path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchStatus {
    /// The path reaches the conclusion
    #[default]
    Success,
    /// The path was abandoned
    Failure,
    /// Some steps remain open
    Partial,
}

impl BranchStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchStatus::Success => "success",
            BranchStatus::Failure => "failure",
            BranchStatus::Partial => "partial",
        }
    }
}

impl std::fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BranchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" => Ok(BranchStatus::Success),
            "failure" => Ok(BranchStatus::Failure),
            "partial" => Ok(BranchStatus::Partial),
            _ => Err(format!("Unknown branch status: {}", s)),
        }
    }
}

/// One self-contained reasoning path, or one sub-question of a multi-part problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBranch {
    /// Branch identifier
    pub id: String,
    /// Display label.
    pub name: String,
    /// Reported outcome
    pub status: BranchStatus,
    /// Short description of the approach
    pub explanation: String,
    /// Always of type [`NodeType::Root`].
    pub root: LogicNode,
    /// Linear written proof; never empty.
    pub forward_proof: String,
}

/// A reference card for a theorem or definition used in the answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeCard {
    /// Theorem or definition name
    pub name: String,
    /// Statement of the theorem
    pub description: String,
    /// Where it is taught; may be empty
    pub textbook_ref: String,
}

/// The full answer to one query.
///
/// Built fresh per query or refinement round and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryResponse {
    /// Given facts, in order
    pub hypothesis: Vec<String>,
    /// The statement to prove
    pub conclusion: String,
    /// Non-empty.
    pub branches: Vec<AnalysisBranch>,
    /// Theorems the answer relies on
    pub knowledge_used: Vec<KnowledgeCard>,
}

impl GeometryResponse {
    /// Branch by position, if present.
    pub fn branch(&self, index: usize) -> Option<&AnalysisBranch> {
        self.branches.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, node_type: NodeType, children: Vec<LogicNode>) -> LogicNode {
        LogicNode {
            id: id.to_string(),
            statement: format!("statement {}", id),
            method: None,
            reason: None,
            node_type,
            children,
            is_proven: false,
        }
    }

    #[test]
    fn test_node_type_serializes_uppercase() {
        assert_eq!(serde_json::to_value(NodeType::Root).unwrap(), "ROOT");
        assert_eq!(serde_json::to_value(NodeType::Leaf).unwrap(), "LEAF");
        assert_eq!(NodeType::default(), NodeType::Node);
    }

    #[test]
    fn test_tree_metrics() {
        let tree = node(
            "r",
            NodeType::Root,
            vec![
                node("a", NodeType::Node, vec![node("a1", NodeType::Leaf, vec![])]),
                node("b", NodeType::Leaf, vec![]),
            ],
        );
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.depth(), 3);
        assert!(!tree.is_terminal());
        assert_eq!(tree.find("a1").map(|n| n.statement.as_str()), Some("statement a1"));
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_branch_status_from_str() {
        assert_eq!("SUCCESS".parse::<BranchStatus>().unwrap(), BranchStatus::Success);
        assert_eq!(" partial ".parse::<BranchStatus>().unwrap(), BranchStatus::Partial);
        assert!("unknown".parse::<BranchStatus>().is_err());
    }

    #[test]
    fn test_logic_node_wire_names() {
        let value = serde_json::to_value(node("x", NodeType::Leaf, vec![])).unwrap();
        assert_eq!(value["type"], "LEAF");
        assert_eq!(value["isProven"], false);
        assert!(value.get("method").is_none());
        assert!(value["children"].as_array().unwrap().is_empty());
    }
}
