//! Normalization of a parsed model payload into a [`GeometryResponse`].

use serde_json::{Map, Value};
use tracing::debug;

use super::extract::{extract_json, parse_json_lenient};
use crate::error::{PipelineError, PipelineResult};
use crate::tree::{
    coerce_text, sanitize_root, AnalysisBranch, BranchStatus, GeometryResponse, KnowledgeCard,
};

/// Fields holding a single tree in payloads without `branches`.
const LEGACY_TREE_FIELDS: &[&str] = &["root", "tree", "logic_tree"];

/// Document-level written proof fields, in order of preference.
const GLOBAL_PROOF_FIELDS: &[&str] = &["forward_proof", "proof"];

/// Written proof used when the model supplied none.
pub const MISSING_PROOF: &str = "No written proof was provided.";

const LEGACY_BRANCH_ID: &str = "main";
const LEGACY_BRANCH_NAME: &str = "Main analysis";

/// Extract, parse and normalize raw model text in one step.
pub fn parse_model_output(raw: &str) -> PipelineResult<GeometryResponse> {
    let candidate = extract_json(raw)?;
    let value = parse_json_lenient(candidate)?;
    normalize_response(&value)
}

/// Turn a parsed payload into a render-safe response.
///
/// Accepts a `branches` array or a single legacy tree. Every array entry
/// becomes a branch; a missing or malformed root is sanitized into a
/// placeholder rather than dropped. Fails with [`PipelineError::NoDiagram`]
/// when there is nothing to build a branch from.
pub fn normalize_response(value: &Value) -> PipelineResult<GeometryResponse> {
    let Some(doc) = value.as_object() else {
        return Err(PipelineError::NoDiagram);
    };

    let global_proof = GLOBAL_PROOF_FIELDS
        .iter()
        .map(|name| text_field(doc, name))
        .find(|text| !text.trim().is_empty());

    let empty = Map::new();
    let branches: Vec<AnalysisBranch> = match doc.get("branches") {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let obj = item.as_object().unwrap_or(&empty);
                normalize_branch(index, obj, global_proof.as_deref())
            })
            .collect(),
        _ => legacy_branch(doc, global_proof.as_deref()).into_iter().collect(),
    };

    if branches.is_empty() {
        return Err(PipelineError::NoDiagram);
    }

    debug!(branches = branches.len(), "Normalized model response");

    Ok(GeometryResponse {
        hypothesis: hypothesis(doc.get("hypothesis")),
        conclusion: text_field(doc, "conclusion"),
        branches,
        knowledge_used: knowledge(doc.get("knowledge_used")),
    })
}

fn normalize_branch(
    index: usize,
    obj: &Map<String, Value>,
    global_proof: Option<&str>,
) -> AnalysisBranch {
    let raw_root = obj
        .get("root")
        .filter(|value| !value.is_null())
        .or_else(|| obj.get("tree"))
        .unwrap_or(&Value::Null);

    let id = non_blank(text_field(obj, "id")).unwrap_or_else(|| format!("branch-{}", index + 1));
    let name = non_blank(text_field(obj, "name")).unwrap_or_else(|| format!("Branch {}", index + 1));
    let status = obj
        .get("status")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();

    AnalysisBranch {
        id,
        name,
        status,
        explanation: text_field(obj, "explanation"),
        root: sanitize_root(raw_root),
        forward_proof: forward_proof(obj, global_proof),
    }
}

fn legacy_branch(doc: &Map<String, Value>, global_proof: Option<&str>) -> Option<AnalysisBranch> {
    let raw_root = LEGACY_TREE_FIELDS
        .iter()
        .filter_map(|name| doc.get(*name))
        .find(|value| !value.is_null())?;

    Some(AnalysisBranch {
        id: LEGACY_BRANCH_ID.to_string(),
        name: LEGACY_BRANCH_NAME.to_string(),
        status: BranchStatus::Success,
        explanation: text_field(doc, "explanation"),
        root: sanitize_root(raw_root),
        forward_proof: global_proof.unwrap_or(MISSING_PROOF).to_string(),
    })
}

fn forward_proof(obj: &Map<String, Value>, global_proof: Option<&str>) -> String {
    non_blank(text_field(obj, "forward_proof"))
        .or_else(|| global_proof.map(str::to_string))
        .unwrap_or_else(|| MISSING_PROOF.to_string())
}

fn hypothesis(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(coerce_text)
            .filter(|text| !text.trim().is_empty())
            .collect(),
        Some(Value::String(text)) if !text.trim().is_empty() => vec![text.clone()],
        _ => Vec::new(),
    }
}

fn knowledge(value: Option<&Value>) -> Vec<KnowledgeCard> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|card| KnowledgeCard {
            name: text_field(card, "name"),
            description: text_field(card, "description"),
            textbook_ref: text_field(card, "textbook_ref"),
        })
        .collect()
}

fn text_field(obj: &Map<String, Value>, name: &str) -> String {
    obj.get(name).map(coerce_text).unwrap_or_default()
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
