//! Locating and parsing the JSON object inside raw model text.

use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};

/// Characters that may legally follow a backslash in a JSON string.
const JSON_ESCAPES: &[char] = &['\\', '"', '/', 'b', 'f', 'n', 'r', 't'];

/// Extract the first top-level JSON object from model output.
///
/// Strips a surrounding code fence, then scans from the first `{` to its
/// matching `}` so commentary before or after the object is dropped. Braces
/// inside string literals do not count. If the object never closes, the text
/// up to the last `}` is returned and left for the parser to judge.
pub fn extract_json(raw: &str) -> PipelineResult<&str> {
    let text = strip_code_fence(raw);

    let Some(start) = text.find('{') else {
        return Err(no_json(raw));
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    match text.rfind('}') {
        Some(end) if end > start => Ok(&text[start..=end]),
        _ => Err(no_json(raw)),
    }
}

/// Double every backslash that does not start a valid JSON escape.
///
/// Models often emit raw LaTeX (`\widehat`, `\perp`) inside JSON strings.
/// This is a heuristic: a lone backslash meant literally is doubled too, and
/// LaTeX commands that happen to start with a valid escape (`\frac`, `\neq`)
/// are left alone.
pub fn repair_backslashes(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }

        match chars.get(i + 1) {
            Some(&next) if JSON_ESCAPES.contains(&next) => {
                out.push(c);
                out.push(next);
                i += 2;
            }
            Some('u') if is_unicode_escape(&chars[i + 2..]) => {
                out.push_str("\\u");
                i += 2;
            }
            _ => {
                out.push_str("\\\\");
                i += 1;
            }
        }
    }

    out
}

/// Strict parse, then one repaired retry.
///
/// The error names the original parse failure, not the retry's.
pub fn parse_json_lenient(candidate: &str) -> PipelineResult<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Ok(value),
        Err(original) => {
            debug!(error = %original, "Strict JSON parse failed; retrying with escaped backslashes");
            serde_json::from_str::<Value>(&repair_backslashes(candidate)).map_err(|_| {
                PipelineError::JsonSyntax {
                    message: original.to_string(),
                }
            })
        }
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string (`json`, `JSON`, ...) along with the fence.
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text
}

fn is_unicode_escape(rest: &[char]) -> bool {
    rest.len() >= 4 && rest[..4].iter().all(|c| c.is_ascii_hexdigit())
}

fn no_json(raw: &str) -> PipelineError {
    PipelineError::NoJsonFound {
        preview: raw.chars().take(100).collect(),
    }
}
