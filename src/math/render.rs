//! Rendering segments through an external math typesetter.
//!
//! The typesetter is consumed through [`MathRenderer`]. A failure on one
//! segment turns that segment into [`Fragment::Broken`] carrying its raw
//! source; the rest of the document still renders.

use serde::Serialize;
use tracing::debug;

use super::glyphs::to_unicode;
use super::segment::{segment, segment_document, Line, Segment};
use crate::error::RenderError;

/// Math typesetter seam: normalized source in, visual markup out.
pub trait MathRenderer {
    /// Render one math expression; `display` selects block layout.
    fn render(&self, source: &str, display: bool) -> Result<String, RenderError>;
}

/// Output unit of the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// Plain prose
    Text {
        /// Display text
        text: String,
    },
    /// Emphasized prose
    Bold {
        /// Display text, without the `**` markers
        text: String,
    },
    /// Typeset math
    Math {
        /// Renderer output
        markup: String,
        /// Block (display) rather than inline
        display: bool,
    },
    /// Raw source of a segment the typesetter rejected.
    Broken {
        /// The segment exactly as written
        source: String,
    },
    /// Vertical spacing in block mode.
    Blank,
}

/// Terminal typesetter: flattens LaTeX to Unicode glyphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeMathRenderer;

impl MathRenderer for UnicodeMathRenderer {
    fn render(&self, source: &str, display: bool) -> Result<String, RenderError> {
        let mut depth: i32 = 0;
        for c in source.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                break;
            }
        }
        if depth != 0 {
            return Err(RenderError::Math {
                source_text: source.to_string(),
                message: "unbalanced braces".to_string(),
            });
        }

        let flat = to_unicode(source);
        let flat = flat.split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(if display { format!("    {}", flat) } else { flat })
    }
}

/// Render already-classified segments.
pub fn render_segments(segments: &[Segment], renderer: &dyn MathRenderer) -> Vec<Fragment> {
    segments
        .iter()
        .map(|seg| match seg {
            Segment::Text { content } => Fragment::Text {
                text: content.replace("\\$", "$"),
            },
            Segment::Bold { content } => Fragment::Bold {
                text: content.clone(),
            },
            Segment::InlineMath { .. } | Segment::BlockMath { .. } => {
                let display = matches!(seg, Segment::BlockMath { .. });
                let source = seg.math_source().unwrap_or_default();
                match renderer.render(&source, display) {
                    Ok(markup) => Fragment::Math { markup, display },
                    Err(e) => {
                        debug!(error = %e, "Math segment failed to render; showing source");
                        Fragment::Broken {
                            source: seg.source(),
                        }
                    }
                }
            }
        })
        .collect()
}

/// Segment and render a single-line string.
pub fn render_text(input: &str, renderer: &dyn MathRenderer) -> Vec<Fragment> {
    render_segments(&segment(input), renderer)
}

/// Segment and render a multi-line document, one fragment list per line.
pub fn render_document(input: &str, renderer: &dyn MathRenderer) -> Vec<Vec<Fragment>> {
    segment_document(input)
        .into_iter()
        .map(|line| match line {
            Line::Blank => vec![Fragment::Blank],
            Line::Content(segments) => render_segments(&segments, renderer),
        })
        .collect()
}

/// Flatten fragments into terminal text; broken math is fenced with `⟦ ⟧`.
pub fn fragments_to_plain(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        match fragment {
            Fragment::Text { text } | Fragment::Bold { text } => out.push_str(text),
            Fragment::Math { markup, display } => {
                if *display && !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(markup);
                if *display {
                    out.push('\n');
                }
            }
            Fragment::Broken { source } => {
                out.push('⟦');
                out.push_str(source);
                out.push('⟧');
            }
            Fragment::Blank => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingRenderer;

    impl MathRenderer for FailingRenderer {
        fn render(&self, source: &str, _display: bool) -> Result<String, RenderError> {
            if source.contains("bad") {
                Err(RenderError::Math {
                    source_text: source.to_string(),
                    message: "parse error".to_string(),
                })
            } else {
                Ok(format!("<m>{}</m>", source))
            }
        }
    }

    #[test]
    fn test_render_passes_normalized_source() {
        let fragments = render_text("angle $\\angle A$", &FailingRenderer);
        assert_eq!(
            fragments[1],
            Fragment::Math {
                markup: "<m>\\widehat{A}</m>".to_string(),
                display: false,
            }
        );
    }

    #[test]
    fn test_failed_segment_degrades_to_source() {
        let fragments = render_text("ok $x$ then $$bad$$ end", &FailingRenderer);
        assert_eq!(fragments.len(), 5);
        assert!(matches!(fragments[1], Fragment::Math { .. }));
        assert_eq!(
            fragments[3],
            Fragment::Broken {
                source: "$$bad$$".to_string()
            }
        );
        assert_eq!(fragments[4], Fragment::Text { text: " end".to_string() });
    }

    #[test]
    fn test_unicode_renderer() {
        let renderer = UnicodeMathRenderer;
        assert_eq!(
            renderer.render("\\widehat{ABC} = 90^\\circ", false).unwrap(),
            "∠ABC = 90°"
        );
        assert!(renderer.render("\\frac{1}{2", false).is_err());
        assert!(renderer.render("}{", false).is_err());
    }

    #[test]
    fn test_render_document_marks_blank_lines() {
        let lines = render_document("line $a$\n\nnext", &UnicodeMathRenderer);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], vec![Fragment::Blank]);
        assert_eq!(fragments_to_plain(&lines[0]), "line a");
    }

    #[test]
    fn test_escaped_dollar_renders_as_dollar() {
        let fragments = render_text(r"costs \$5 and $x^2$", &UnicodeMathRenderer);
        assert_eq!(fragments_to_plain(&fragments), "costs $5 and x²");
    }

    #[test]
    fn test_plain_output_fences_broken_math() {
        let fragments = render_text("x $$bad$$", &FailingRenderer);
        assert_eq!(fragments_to_plain(&fragments), "x ⟦$$bad$$⟧");
    }
}
