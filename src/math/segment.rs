//! Splitting mixed prose/math strings into typed segments.
//!
//! The classifier is total: every character of the input ends up in exactly
//! one segment, and [`Segment::source`] gives back the exact text a segment
//! was cut from, so joining the sources reconstructs the input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::normalize::normalize_math;

/// Residual chunks shorter than this (in chars) may be auto-detected as math.
pub const AUTO_MATH_MAX_CHARS: usize = 60;

/// Delimited math, in priority order: `$$..$$`, `\[..\]`, `\(..\)`, `$..$`.
/// A `\$` outside math is an escaped literal dollar and opens nothing.
static DELIMITED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$\$([\s\S]+?)\$\$|\\\[([\s\S]+?)\\\]|\\\(([\s\S]+?)\\\)|\$((?:\\[\s\S]|[^$\\])+?)\$|\\\$",
    )
    .expect("valid delimiter regex")
});

static MATH_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[A-Za-z]+|[=<>≤≥≠^]").expect("valid math hint regex"));

static PLAIN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[\p{L}\p{N}_\s.,;:!?()'"\-]*$"#).expect("valid plain text regex")
});

static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([\s\S]+?)\*\*").expect("valid bold regex"));

/// How a math segment was marked in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// `$...$`
    Dollar,
    /// `$$...$$`
    DoubleDollar,
    /// `\(...\)`
    Paren,
    /// `\[...\]`
    Bracket,
    /// No delimiters; classified by heuristic.
    Auto,
}

/// A contiguous run of one content kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Plain prose
    Text {
        /// Text as written
        content: String,
    },
    /// `**bold**` prose
    Bold {
        /// Text between the markers
        content: String,
    },
    /// Math inside `$..$`, `\(..\)` or auto-detected
    InlineMath {
        /// Math source without delimiters
        content: String,
        /// How it was marked
        delimiter: Delimiter,
    },
    /// Math inside `$$..$$` or `\[..\]`
    BlockMath {
        /// Math source without delimiters
        content: String,
        /// How it was marked
        delimiter: Delimiter,
    },
}

impl Segment {
    /// Plain text segment.
    pub fn text(content: impl Into<String>) -> Self {
        Segment::Text {
            content: content.into(),
        }
    }

    /// Content without delimiters, as written.
    pub fn content(&self) -> &str {
        match self {
            Segment::Text { content }
            | Segment::Bold { content }
            | Segment::InlineMath { content, .. }
            | Segment::BlockMath { content, .. } => content,
        }
    }

    /// True for inline and block math.
    pub fn is_math(&self) -> bool {
        matches!(self, Segment::InlineMath { .. } | Segment::BlockMath { .. })
    }

    /// Math content after canonical rewrites; `None` for prose.
    pub fn math_source(&self) -> Option<String> {
        match self {
            Segment::InlineMath { content, .. } | Segment::BlockMath { content, .. } => {
                Some(normalize_math(content))
            }
            _ => None,
        }
    }

    /// The exact source text this segment was cut from.
    pub fn source(&self) -> String {
        match self {
            Segment::Text { content } => content.clone(),
            Segment::Bold { content } => format!("**{}**", content),
            Segment::InlineMath { content, delimiter } | Segment::BlockMath { content, delimiter } => {
                match delimiter {
                    Delimiter::Dollar => format!("${}$", content),
                    Delimiter::DoubleDollar => format!("$${}$$", content),
                    Delimiter::Paren => format!("\\({}\\)", content),
                    Delimiter::Bracket => format!("\\[{}\\]", content),
                    Delimiter::Auto => content.clone(),
                }
            }
        }
    }
}

/// One line of a multi-line document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Line {
    /// Vertical spacing marker.
    Blank,
    /// Segments of a non-blank line.
    Content(Vec<Segment>),
}

/// Classify a mixed string into ordered segments.
///
/// Unterminated delimiters stay literal text. Undelimited chunks go through
/// [`looks_like_math`], a best-effort heuristic: prose containing a literal
/// `=` or `>` can be misread as math and vice versa.
pub fn segment(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in DELIMITED.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            classify_residual(&input[last..whole.start()], &mut segments);
        }

        let math = if let Some(m) = caps.get(1) {
            Segment::BlockMath {
                content: m.as_str().to_string(),
                delimiter: Delimiter::DoubleDollar,
            }
        } else if let Some(m) = caps.get(2) {
            Segment::BlockMath {
                content: m.as_str().to_string(),
                delimiter: Delimiter::Bracket,
            }
        } else if let Some(m) = caps.get(3) {
            Segment::InlineMath {
                content: m.as_str().to_string(),
                delimiter: Delimiter::Paren,
            }
        } else if let Some(m) = caps.get(4) {
            Segment::InlineMath {
                content: m.as_str().to_string(),
                delimiter: Delimiter::Dollar,
            }
        } else {
            // Escaped `\$`.
            Segment::text(whole.as_str())
        };
        segments.push(math);
        last = whole.end();
    }

    if last < input.len() {
        classify_residual(&input[last..], &mut segments);
    }

    segments
}

/// Segment a multi-line document line by line; blank lines become [`Line::Blank`].
pub fn segment_document(input: &str) -> Vec<Line> {
    input
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| {
            if line.trim().is_empty() {
                Line::Blank
            } else {
                Line::Content(segment(line))
            }
        })
        .collect()
}

/// Heuristic for math written without delimiters.
pub fn looks_like_math(chunk: &str) -> bool {
    MATH_HINT.is_match(chunk) && !PLAIN_TEXT.is_match(chunk)
}

fn classify_residual(chunk: &str, out: &mut Vec<Segment>) {
    let short = chunk.chars().count() < AUTO_MATH_MAX_CHARS;
    if short && looks_like_math(chunk) && (chunk.contains('\\') || chunk.contains('=')) {
        let body = chunk.trim();
        let lead = &chunk[..chunk.len() - chunk.trim_start().len()];
        let trail = &chunk[chunk.trim_end().len()..];
        if !lead.is_empty() {
            out.push(Segment::text(lead));
        }
        out.push(Segment::InlineMath {
            content: body.to_string(),
            delimiter: Delimiter::Auto,
        });
        if !trail.is_empty() {
            out.push(Segment::text(trail));
        }
        return;
    }
    split_bold(chunk, out);
}

fn split_bold(chunk: &str, out: &mut Vec<Segment>) {
    let mut last = 0;
    for caps in BOLD.captures_iter(chunk) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Segment::text(&chunk[last..whole.start()]));
        }
        out.push(Segment::Bold {
            content: inner.as_str().to_string(),
        });
        last = whole.end();
    }
    if last < chunk.len() {
        out.push(Segment::text(&chunk[last..]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined_source(segments: &[Segment]) -> String {
        segments.iter().map(Segment::source).collect()
    }

    #[test]
    fn test_block_math_double_dollar() {
        let segments = segment("$$x^2$$");
        assert_eq!(
            segments,
            vec![Segment::BlockMath {
                content: "x^2".to_string(),
                delimiter: Delimiter::DoubleDollar,
            }]
        );
    }

    #[test]
    fn test_inline_math_sequence() {
        let segments = segment("Let $a=1$ and $b=2$.");
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], Segment::text("Let "));
        assert!(matches!(&segments[1], Segment::InlineMath { content, .. } if content == "a=1"));
        assert_eq!(segments[2], Segment::text(" and "));
        assert!(matches!(&segments[3], Segment::InlineMath { content, .. } if content == "b=2"));
        assert_eq!(segments[4], Segment::text("."));
    }

    #[test]
    fn test_bracket_and_paren_delimiters() {
        let segments = segment("see \\[a+b\\] or \\(c\\)");
        assert!(matches!(
            &segments[1],
            Segment::BlockMath { content, delimiter: Delimiter::Bracket } if content == "a+b"
        ));
        assert!(matches!(
            &segments[3],
            Segment::InlineMath { content, delimiter: Delimiter::Paren } if content == "c"
        ));
    }

    #[test]
    fn test_unterminated_delimiters_stay_literal() {
        for input in ["cost $5", "$$x^2", "\\(open", "$"] {
            let segments = segment(input);
            assert!(segments.iter().all(|s| !s.is_math()), "input: {}", input);
            assert_eq!(joined_source(&segments), input);
        }
    }

    #[test]
    fn test_escaped_dollar_inside_inline_math() {
        let segments = segment("$a\\$b$");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].content(), "a\\$b");
    }

    #[test]
    fn test_escaped_dollar_in_prose_is_literal() {
        let input = r"costs \$5 and $x$";
        let segments = segment(input);

        let math: Vec<&str> = segments
            .iter()
            .filter(|s| s.is_math())
            .map(Segment::content)
            .collect();
        assert_eq!(math, vec!["x"]);

        let rebuilt: String = segments.iter().map(Segment::source).collect();
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn test_auto_detected_math_keeps_surrounding_whitespace() {
        let segments = segment("  AB = AC  ");
        assert_eq!(
            segments,
            vec![
                Segment::text("  "),
                Segment::InlineMath {
                    content: "AB = AC".to_string(),
                    delimiter: Delimiter::Auto,
                },
                Segment::text("  "),
            ]
        );
    }

    #[test]
    fn test_long_mixed_chunk_falls_back_to_text() {
        let input = "Since the two triangles share a side and AB = AC we conclude that they are congruent";
        let segments = segment(input);
        assert!(segments.iter().all(|s| !s.is_math()));
        assert_eq!(joined_source(&segments), input);
    }

    #[test]
    fn test_caret_only_chunk_is_not_auto_math() {
        // A caret marks math, but without `\` or `=` the chunk stays prose.
        let segments = segment("x^2 + y");
        assert_eq!(segments, vec![Segment::text("x^2 + y")]);
    }

    #[test]
    fn test_vietnamese_prose_is_plain_text() {
        assert!(!looks_like_math("Tam giác cân tại đỉnh A"));
        assert!(looks_like_math("\\widehat{A} = 60"));
    }

    #[test]
    fn test_bold_split() {
        let segments = segment("Step **one** then **two**");
        assert_eq!(
            segments,
            vec![
                Segment::text("Step "),
                Segment::Bold {
                    content: "one".to_string()
                },
                Segment::text(" then "),
                Segment::Bold {
                    content: "two".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_segments_cover_input_exactly() {
        for input in [
            "",
            "plain",
            "Let $a=1$ and $b=2$.",
            "$$\\widehat{ABC} = 90^o$$ so **AB** \\perp BC",
            "mixed \\(x\\) and \\[y\\] and $$z$$ and $w$",
            "tail $ unmatched $$ stuff",
            "**unclosed bold",
            "Tam giác $ABC$ cân tại $A$",
        ] {
            assert_eq!(joined_source(&segment(input)), input, "input: {}", input);
        }
    }

    #[test]
    fn test_math_source_is_normalized() {
        let segments = segment("$\\angle ABC = 60^o$");
        assert_eq!(
            segments[0].math_source().as_deref(),
            Some("\\widehat{ABC} = 60^\\circ")
        );
        assert_eq!(segments[0].content(), "\\angle ABC = 60^o");
        assert!(Segment::text("\\angle ABC").math_source().is_none());
    }

    #[test]
    fn test_segment_document_blank_lines() {
        let lines = segment_document("first $x$\r\n\n  \nlast");
        assert_eq!(lines.len(), 4);
        assert!(matches!(&lines[0], Line::Content(s) if s.len() == 2));
        assert_eq!(lines[1], Line::Blank);
        assert_eq!(lines[2], Line::Blank);
        assert!(matches!(&lines[3], Line::Content(s) if s == &vec![Segment::text("last")]));
    }
}
