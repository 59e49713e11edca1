use once_cell::sync::Lazy;
use serde_json::json;
use std::collections::HashSet;
use std::fmt::Write as _;

use super::label::build_label;
use crate::config::DiagramConfig;
use crate::tree::{LogicNode, NodeType};

/// Label of the stand-in node emitted for an empty tree.
pub const EMPTY_TREE_LABEL: &str = "No data";

const EMPTY_TREE_KEY: &str = "n_empty";

/// Renderer start-up options, serialized once for the whole process.
static INIT_DIRECTIVE: Lazy<String> = Lazy::new(|| {
    let init = json!({
        "theme": "base",
        "flowchart": {
            "curve": "basis",
            "htmlLabels": true,
            "nodeSpacing": 40,
            "rankSpacing": 50,
            "padding": 12
        },
        "themeVariables": {
            "fontFamily": "Inter, Segoe UI, sans-serif",
            "fontSize": "14px",
            "lineColor": "#64748b"
        }
    });
    format!("%%{{init: {}}}%%", init)
});

const CLASS_DEFS: &[&str] = &[
    "classDef rootNode fill:#1e3a8a,stroke:#1e40af,stroke-width:2px,color:#ffffff",
    "classDef leafNode fill:#ecfdf5,stroke:#059669,stroke-width:1.5px,color:#064e3b",
    "classDef stepNode fill:#f8fafc,stroke:#64748b,stroke-width:1.5px,color:#0f172a",
];

/// Flow direction of the rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutDirection {
    /// Conclusion at the bottom, hypotheses on top.
    BottomToTop,
    /// Hypotheses on top flowing down to the conclusion.
    TopToBottom,
}

impl LayoutDirection {
    /// Mermaid direction keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutDirection::BottomToTop => "BT",
            LayoutDirection::TopToBottom => "TB",
        }
    }
}

/// How a parent→child relation is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    /// Both toggles on: one arrow each way.
    Bidirectional,
    /// Parent points at the sub-goal it needs.
    Analysis,
    /// Sub-goal points at the claim it proves.
    Proof,
    /// Both toggles off.
    Undirected,
}

impl EdgeStyle {
    fn link_style(&self) -> &'static str {
        match self {
            EdgeStyle::Bidirectional => "stroke:#7c3aed,stroke-width:2.5px",
            EdgeStyle::Analysis => "stroke:#2563eb,stroke-width:2px",
            EdgeStyle::Proof => "stroke:#16a34a,stroke-width:2px",
            EdgeStyle::Undirected => "stroke:#94a3b8,stroke-width:1.5px",
        }
    }
}

/// Rendering options for [`compile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramOptions {
    /// Maximum characters per label line.
    pub wrap_width: usize,
    /// Methods longer than this are not shown.
    pub method_max_len: usize,
    /// Append the method under each statement.
    pub show_method: bool,
    /// Draw arrows from a claim to its sub-goals.
    pub analysis_arrows: bool,
    /// Draw arrows from sub-goals to the claim they prove.
    pub proof_arrows: bool,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self::from(&DiagramConfig::default())
    }
}

impl From<&DiagramConfig> for DiagramOptions {
    fn from(config: &DiagramConfig) -> Self {
        Self {
            wrap_width: config.wrap_width,
            method_max_len: config.method_max_len,
            show_method: config.show_method,
            analysis_arrows: config.analysis_arrows,
            proof_arrows: config.proof_arrows,
        }
    }
}

impl DiagramOptions {
    /// Edge style implied by the two arrow toggles
    pub fn edge_style(&self) -> EdgeStyle {
        match (self.analysis_arrows, self.proof_arrows) {
            (true, true) => EdgeStyle::Bidirectional,
            (true, false) => EdgeStyle::Analysis,
            (false, true) => EdgeStyle::Proof,
            (false, false) => EdgeStyle::Undirected,
        }
    }

    /// Layout direction; only the proof-only view flows top to bottom
    pub fn direction(&self) -> LayoutDirection {
        match self.edge_style() {
            EdgeStyle::Proof => LayoutDirection::TopToBottom,
            _ => LayoutDirection::BottomToTop,
        }
    }
}

/// The `%%{init}%%` directive prefixed to every diagram.
pub fn init_directive() -> &'static str {
    INIT_DIRECTIVE.as_str()
}

/// Compile a logic tree into Mermaid flowchart source.
///
/// Output depends only on the tree and the options. `None` yields a valid
/// graph holding a single placeholder node.
pub fn compile(root: Option<&LogicNode>, options: &DiagramOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", init_directive());
    let _ = writeln!(out, "flowchart {}", options.direction().as_str());
    for class_def in CLASS_DEFS {
        let _ = writeln!(out, "    {}", class_def);
    }

    let Some(root) = root else {
        let _ = writeln!(out, "    {}[\"{}\"]:::stepNode", EMPTY_TREE_KEY, EMPTY_TREE_LABEL);
        return out;
    };

    let mut builder = GraphBuilder::new(options);
    builder.visit(root);

    for line in &builder.nodes {
        let _ = writeln!(out, "    {}", line);
    }
    for line in &builder.edges {
        let _ = writeln!(out, "    {}", line);
    }
    let style = options.edge_style().link_style();
    for index in 0..builder.edges.len() {
        let _ = writeln!(out, "    linkStyle {} {}", index, style);
    }

    out
}

struct GraphBuilder<'a> {
    options: &'a DiagramOptions,
    used_keys: HashSet<String>,
    nodes: Vec<String>,
    edges: Vec<String>,
}

impl<'a> GraphBuilder<'a> {
    fn new(options: &'a DiagramOptions) -> Self {
        Self {
            options,
            used_keys: HashSet::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Depth-first: declare the node, then each child followed by its edge.
    fn visit(&mut self, node: &LogicNode) -> String {
        let key = self.key_for(&node.id);
        let label = build_label(
            &node.statement,
            node.method.as_deref(),
            self.options.wrap_width,
            self.options.show_method,
            self.options.method_max_len,
        );
        self.nodes
            .push(format!("{}[\"{}\"]:::{}", key, label, class_for(node)));

        for child in &node.children {
            let child_key = self.visit(child);
            self.edges.push(self.edge(&key, &child_key));
        }

        key
    }

    fn edge(&self, parent: &str, child: &str) -> String {
        match self.options.edge_style() {
            EdgeStyle::Bidirectional => format!("{} <--> {}", parent, child),
            EdgeStyle::Analysis => format!("{} --> {}", parent, child),
            EdgeStyle::Proof => format!("{} --> {}", child, parent),
            EdgeStyle::Undirected => format!("{} --- {}", parent, child),
        }
    }

    /// `n_` plus the id with non-alphanumerics mapped to `_`; a taken key gets the first free numeric suffix.
    fn key_for(&mut self, id: &str) -> String {
        let mut base = String::from("n_");
        base.extend(
            id.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
        );

        let mut key = base.clone();
        let mut suffix = 1;
        while self.used_keys.contains(&key) {
            suffix += 1;
            key = format!("{}_{}", base, suffix);
        }
        self.used_keys.insert(key.clone());
        key
    }
}

fn class_for(node: &LogicNode) -> &'static str {
    match node.node_type {
        NodeType::Root => "rootNode",
        NodeType::Leaf => "leafNode",
        NodeType::Node if node.is_terminal() => "leafNode",
        NodeType::Node => "stepNode",
    }
}
