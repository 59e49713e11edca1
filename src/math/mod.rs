//! Mixed text/math handling.
//!
//! - [`segment`]: classify a string into text, bold, inline and block math
//! - [`normalize_math`]: canonical angle and degree notation
//! - [`render_text`] / [`render_document`]: drive a [`MathRenderer`] with
//!   per-segment failure containment
//!
//! Every surface that shows a domain string (node cards, proofs, reports)
//! goes through this module rather than splitting text itself.

mod glyphs;
mod normalize;
mod render;
mod segment;

pub use glyphs::to_unicode;
pub use normalize::normalize_math;
pub use render::*;
pub use segment::*;
