//! Node label cleaning and wrapping.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::math::{segment, to_unicode, Delimiter, Segment};

/// Inline HTML the model sometimes emits in statements.
static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)</?(?:b|i|u|s|em|strong|br|sub|sup|span|div|p|small|big|font|code|mark|del|ins)(?:\s+[a-z-]+(?:=(?:"[^"]*"|'[^']*'|[^\s<>]+))?)*\s*/?>"#,
    )
    .expect("valid tag regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Reduce a mixed text/math string to plain Unicode suitable for a diagram label.
///
/// Markup tags are stripped outside delimited math; math keeps its `<` and `>`.
pub fn clean_label(text: &str) -> String {
    let without_tags: String = segment(text)
        .iter()
        .map(|part| {
            let source = part.source();
            if is_delimited_math(part) {
                source
            } else {
                TAG.replace_all(&source, " ").into_owned()
            }
        })
        .collect();
    let flattened = to_unicode(&without_tags);
    WHITESPACE.replace_all(flattened.trim(), " ").into_owned()
}

fn is_delimited_math(part: &Segment) -> bool {
    match part {
        Segment::InlineMath { delimiter, .. } | Segment::BlockMath { delimiter, .. } => {
            *delimiter != Delimiter::Auto
        }
        _ => false,
    }
}

/// Greedy word wrap: words accumulate on a line until the next would overflow `width`.
///
/// A single word longer than `width` gets a line of its own and is not split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Escape text for use inside a quoted Mermaid label.
pub fn escape_label(text: &str) -> String {
    text.replace('"', "#quot;")
        .replace('<', "#lt;")
        .replace('>', "#gt;")
}

/// Build the full label for a node: wrapped statement, then an optional `[method]` line.
pub fn build_label(
    statement: &str,
    method: Option<&str>,
    width: usize,
    show_method: bool,
    method_max_len: usize,
) -> String {
    let mut lines: Vec<String> = wrap_text(&clean_label(statement), width)
        .iter()
        .map(|line| escape_label(line))
        .collect();

    if show_method {
        if let Some(method) = method.map(clean_label).filter(|m| !m.is_empty()) {
            if method.chars().count() <= method_max_len {
                lines.push(format!("[{}]", escape_label(&method)));
            }
        }
    }

    if lines.is_empty() {
        lines.push(crate::tree::PLACEHOLDER_STATEMENT.to_string());
    }
    lines.join("<br/>")
}
