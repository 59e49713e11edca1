//! Plain-text report of a full answer.

use std::fmt::Write as _;

use crate::math::{fragments_to_plain, render_document, render_text, MathRenderer};
use crate::tree::{GeometryResponse, LogicNode};

fn inline(text: &str, renderer: &dyn MathRenderer) -> String {
    fragments_to_plain(&render_text(text, renderer))
}

fn block(text: &str, renderer: &dyn MathRenderer) -> String {
    render_document(text, renderer)
        .iter()
        .map(|line| fragments_to_plain(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn outline(node: &LogicNode, depth: usize, renderer: &dyn MathRenderer, out: &mut String) {
    let marker = if node.is_proven { '✓' } else { '·' };
    let _ = write!(
        out,
        "{}{} {}",
        "  ".repeat(depth + 1),
        marker,
        inline(&node.statement, renderer)
    );
    if let Some(method) = &node.method {
        let _ = write!(out, "  [{}]", inline(method, renderer));
    }
    out.push('\n');
    for child in &node.children {
        outline(child, depth + 1, renderer, out);
    }
}

/// Render hypotheses, conclusion, every branch and the knowledge cards.
pub fn render_report(response: &GeometryResponse, renderer: &dyn MathRenderer) -> String {
    let mut out = String::new();

    if !response.hypothesis.is_empty() {
        out.push_str("Given:\n");
        for (i, fact) in response.hypothesis.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, inline(fact, renderer));
        }
    }
    if !response.conclusion.trim().is_empty() {
        let _ = writeln!(out, "To prove: {}", inline(&response.conclusion, renderer));
    }

    for (i, branch) in response.branches.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n== Branch {}: {} [{}] ==",
            i + 1,
            inline(&branch.name, renderer),
            branch.status
        );
        if !branch.explanation.trim().is_empty() {
            let _ = writeln!(out, "{}", block(&branch.explanation, renderer));
        }

        out.push_str("\nAnalysis:\n");
        outline(&branch.root, 0, renderer, &mut out);

        out.push_str("\nWritten proof:\n");
        let _ = writeln!(out, "{}", block(&branch.forward_proof, renderer));
    }

    if !response.knowledge_used.is_empty() {
        out.push_str("\nKnowledge used:\n");
        for card in &response.knowledge_used {
            let _ = write!(out, "  - {}", inline(&card.name, renderer));
            if !card.description.trim().is_empty() {
                let _ = write!(out, ": {}", inline(&card.description, renderer));
            }
            if !card.textbook_ref.trim().is_empty() {
                let _ = write!(out, " ({})", card.textbook_ref);
            }
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::UnicodeMathRenderer;
    use crate::pipeline::normalize_response;
    use serde_json::json;

    #[test]
    fn test_report_sections() {
        let response = normalize_response(&json!({
            "hypothesis": ["$AB = AC$"],
            "conclusion": "$AM \\perp BC$",
            "branches": [{
                "name": "Question a",
                "status": "partial",
                "root": {
                    "statement": "$AM \\perp BC$",
                    "method": "SSS",
                    "isProven": true,
                    "children": [{"statement": "$MB = MC$", "type": "LEAF"}]
                },
                "forward_proof": "First.\n\nThen $\\widehat{AMB} = 90^\\circ$."
            }],
            "knowledge_used": [{"name": "SSS", "description": "Side-side-side", "textbook_ref": "Ch. 4"}]
        }))
        .unwrap();

        let report = render_report(&response, &UnicodeMathRenderer);
        assert!(report.contains("  1. AB = AC\n"));
        assert!(report.contains("To prove: AM ⊥ BC\n"));
        assert!(report.contains("== Branch 1: Question a [partial] =="));
        assert!(report.contains("  ✓ AM ⊥ BC  [SSS]\n    · MB = MC\n"));
        assert!(report.contains("First.\n\nThen ∠AMB = 90°."));
        assert!(report.contains("  - SSS: Side-side-side (Ch. 4)"));
    }

    #[test]
    fn test_broken_math_is_visible() {
        let response = normalize_response(&json!({
            "root": {"statement": "Bad $\\frac{1}{2$ here"}
        }))
        .unwrap();
        let report = render_report(&response, &UnicodeMathRenderer);
        assert!(report.contains("Bad ⟦$\\frac{1}{2$⟧ here"));
    }
}
