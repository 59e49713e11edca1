//! Canonical rewrites applied to math content before rendering.
//!
//! Angles become `\widehat{..}` and bare degree marks become `^\circ`.
//! Every rewrite is idempotent and only ever touches math content.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ANGLE_BRACED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\angle\s*\{([^{}]*)\}").expect("valid angle regex"));

static ANGLE_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\angle\s*([A-Za-z]+'*)").expect("valid angle regex"));

static HAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\hat\s*\{([^{}]*)\}").expect("valid hat regex"));

static WIDEHAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\widehat\s*\{([^{}]*)\}").expect("valid widehat regex"));

static DEGREE_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*\^\s*o\b").expect("valid degree regex"));

static DEGREE_BRACED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*\^\s*\{\s*o\s*\}").expect("valid degree regex"));

/// Rewrite non-canonical angle and degree notation into canonical form.
pub fn normalize_math(source: &str) -> String {
    let widehat = |caps: &Captures| format!("\\widehat{{{}}}", collapse_whitespace(&caps[1]));

    let text = ANGLE_BRACED.replace_all(source, widehat);
    let text = ANGLE_BARE.replace_all(&text, widehat);
    let text = HAT.replace_all(&text, widehat);
    let text = WIDEHAT.replace_all(&text, widehat);
    let text = DEGREE_BARE.replace_all(&text, "${1}^\\circ");
    let text = DEGREE_BRACED.replace_all(&text, "${1}^\\circ");
    text.into_owned()
}

fn collapse_whitespace(arg: &str) -> String {
    arg.chars().filter(|c| !c.is_whitespace()).collect()
}
