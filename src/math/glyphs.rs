//! LaTeX-to-Unicode flattening shared by the terminal math renderer and the
//! diagram label cleaner.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Command → glyph table. Unknown commands lose their backslash only.
const SYMBOLS: &[(&str, &str)] = &[
    ("triangle", "△"),
    ("angle", "∠"),
    ("perp", "⊥"),
    ("parallel", "∥"),
    ("Rightarrow", "⇒"),
    ("implies", "⇒"),
    ("rightarrow", "→"),
    ("to", "→"),
    ("Leftarrow", "⇐"),
    ("leftarrow", "←"),
    ("Leftrightarrow", "⇔"),
    ("iff", "⇔"),
    ("leftrightarrow", "↔"),
    ("cong", "≅"),
    ("sim", "∼"),
    ("equiv", "≡"),
    ("in", "∈"),
    ("notin", "∉"),
    ("subset", "⊂"),
    ("subseteq", "⊆"),
    ("cdot", "·"),
    ("times", "×"),
    ("circ", "°"),
    ("degree", "°"),
    ("neq", "≠"),
    ("ne", "≠"),
    ("leq", "≤"),
    ("le", "≤"),
    ("geq", "≥"),
    ("ge", "≥"),
    ("pm", "±"),
    ("approx", "≈"),
    ("cap", "∩"),
    ("cup", "∪"),
    ("infty", "∞"),
    ("therefore", "∴"),
    ("because", "∵"),
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("pi", "π"),
    ("Delta", "Δ"),
    ("left", ""),
    ("right", ""),
    ("quad", " "),
];

static SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[,;:! ]|\\\\").expect("valid spacing regex"));

static WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\(?:text|textbf|textit|mathrm|mathbf|mathit|operatorname|overline|vec|boxed)\s*\{([^{}]*)\}",
    )
    .expect("valid wrapper regex")
});

static ANGLE_ARG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:widehat|hat)\s*\{([^{}]*)\}").expect("valid angle regex"));

static FRACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\[dt]?frac\s*\{([^{}]*)\}\s*\{([^{}]*)\}").expect("valid fraction regex")
});

static ROOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\sqrt\s*\{([^{}]*)\}").expect("valid sqrt regex"));

static DEGREE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\^\s*\{\s*\\circ\s*\}|\^\s*\\circ").expect("valid degree regex"));

static SQUARED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\^\s*\{\s*2\s*\}|\^2\b").expect("valid square regex"));

static CUBED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\^\s*\{\s*3\s*\}|\^3\b").expect("valid cube regex"));

static COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([A-Za-z]+)").expect("valid command regex"));

static SUBSCRIPT_BRACED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_\{([^{}]*)\}").expect("valid subscript regex"));

static SUBSCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_(\w)").expect("valid subscript regex"));

/// Flatten LaTeX-like math into plain Unicode text.
pub fn to_unicode(source: &str) -> String {
    let mut text = SPACING.replace_all(source, " ").into_owned();

    // Wrappers nest (`\text{\mathbf{x}}`); peel a few layers.
    for _ in 0..3 {
        let next = WRAPPER.replace_all(&text, "${1}").into_owned();
        if next == text {
            break;
        }
        text = next;
    }

    let text = ANGLE_ARG.replace_all(&text, "∠${1}");
    let text = FRACTION.replace_all(&text, "${1}/${2}");
    let text = ROOT.replace_all(&text, "√${1}");
    let text = DEGREE.replace_all(&text, "°");
    let text = SQUARED.replace_all(&text, "²");
    let text = CUBED.replace_all(&text, "³");
    let text = COMMAND.replace_all(&text, |caps: &Captures| {
        let name = &caps[1];
        SYMBOLS
            .iter()
            .find(|(command, _)| *command == name)
            .map(|(_, glyph)| glyph.to_string())
            .unwrap_or_else(|| name.to_string())
    });
    let text = SUBSCRIPT_BRACED.replace_all(&text, "${1}");
    let text = SUBSCRIPT.replace_all(&text, "${1}");

    text.chars()
        .filter(|c| !matches!(c, '$' | '\\' | '{' | '}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        assert_eq!(to_unicode("\\triangle ABC \\cong \\triangle DEF"), "△ ABC ≅ △ DEF");
        assert_eq!(to_unicode("AM \\perp BC"), "AM ⊥ BC");
        assert_eq!(to_unicode("a \\in b"), "a ∈ b");
        assert_eq!(to_unicode("\\infty"), "∞");
    }

    #[test]
    fn test_angles_degrees_and_powers() {
        assert_eq!(to_unicode("\\widehat{ABC} = 90^\\circ"), "∠ABC = 90°");
        assert_eq!(to_unicode("AB^2 + AC^{2}"), "AB² + AC²");
        assert_eq!(to_unicode("60^{\\circ}"), "60°");
    }

    #[test]
    fn test_wrappers_fractions_and_subscripts() {
        assert_eq!(to_unicode("\\text{\\textbf{bold}}"), "bold");
        assert_eq!(to_unicode("\\frac{1}{2}BC"), "1/2BC");
        assert_eq!(to_unicode("A_1 B_{12}"), "A1 B12");
        assert_eq!(to_unicode("$x$"), "x");
    }

    #[test]
    fn test_unknown_command_keeps_name() {
        assert_eq!(to_unicode("\\foo x"), "foo x");
    }
}
