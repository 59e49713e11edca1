//! Proof tree to Mermaid flowchart compilation, rendering and export.
//!
//! [`compile`] is pure string building and cannot fail. Turning its output
//! into pixels is delegated to a [`DiagramRenderer`], whose failures are
//! contained by [`render_diagram`].

mod compiler;
mod export;
mod label;

pub use compiler::{
    compile, init_directive, DiagramOptions, EdgeStyle, LayoutDirection, EMPTY_TREE_LABEL,
};
#[cfg(feature = "mermaid")]
pub use export::MermaidSvgRenderer;
pub use export::{
    export, export_png, export_svg, export_to_file, render_diagram, DiagramRenderer,
    DiagramState, ExportFormat, PNG_SCALE,
};
pub use label::{build_label, clean_label, escape_label, wrap_text};
