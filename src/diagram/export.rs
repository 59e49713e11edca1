//! Rendering compiled diagram source and exporting the result.

use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{ExportError, RenderError};

/// Supersampling factor for raster export.
pub const PNG_SCALE: f32 = 2.0;

/// Turns Mermaid source into an SVG document.
pub trait DiagramRenderer {
    /// Render one diagram; errors are reported, never raised as panics to the caller.
    fn render(&self, source: &str) -> Result<String, RenderError>;
}

/// Outcome of rendering one diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum DiagramState {
    /// Rendered SVG markup.
    Rendered(String),
    /// Visible error message shown in place of the diagram.
    Failed(String),
}

impl DiagramState {
    /// The SVG, if rendering succeeded
    pub fn svg(&self) -> Option<&str> {
        match self {
            DiagramState::Rendered(svg) => Some(svg),
            DiagramState::Failed(_) => None,
        }
    }

    /// True when rendering failed
    pub fn is_failed(&self) -> bool {
        matches!(self, DiagramState::Failed(_))
    }
}

/// Render diagram source, containing any renderer failure or panic.
pub fn render_diagram(renderer: &dyn DiagramRenderer, source: &str) -> DiagramState {
    match catch_unwind(AssertUnwindSafe(|| renderer.render(source))) {
        Ok(Ok(svg)) => DiagramState::Rendered(svg),
        Ok(Err(e)) => {
            warn!(error = %e, "Diagram render failed");
            DiagramState::Failed(e.to_string())
        }
        Err(_) => {
            warn!("Diagram renderer panicked");
            DiagramState::Failed("Diagram renderer crashed".to_string())
        }
    }
}

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Vector, written as-is.
    Svg,
    /// Raster, supersampled on a white background.
    Png,
}

impl ExportFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            _ => Err(ExportError::Unsupported {
                format: s.to_string(),
            }),
        }
    }
}

/// Vector export is direct serialization.
pub fn export_svg(svg: &str) -> Vec<u8> {
    svg.as_bytes().to_vec()
}

/// Rasterize an SVG at [`PNG_SCALE`] against a white background.
#[cfg(feature = "png")]
pub fn export_png(svg: &str) -> Result<Vec<u8>, ExportError> {
    use resvg::tiny_skia::{Color, Pixmap, Transform};

    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| ExportError::InvalidSvg {
        message: e.to_string(),
    })?;

    let size = tree.size().to_int_size();
    let width = (size.width() as f32 * PNG_SCALE).ceil() as u32;
    let height = (size.height() as f32 * PNG_SCALE).ceil() as u32;
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| ExportError::Rasterize {
        message: format!("Failed to allocate {}x{} pixmap", width, height),
    })?;
    pixmap.fill(Color::WHITE);

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        Transform::from_scale(PNG_SCALE, PNG_SCALE),
        &mut pixmap_mut,
    );

    pixmap.encode_png().map_err(|e| ExportError::Rasterize {
        message: e.to_string(),
    })
}

/// Raster export is unavailable without the `png` feature.
#[cfg(not(feature = "png"))]
pub fn export_png(_svg: &str) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unsupported {
        format: "png (built without the png feature)".to_string(),
    })
}

/// Export an SVG in the requested format.
pub fn export(svg: &str, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Svg => Ok(export_svg(svg)),
        ExportFormat::Png => export_png(svg),
    }
}

/// Export to a file, picking the format from its extension.
pub fn export_to_file(svg: &str, path: &Path) -> Result<ExportFormat, ExportError> {
    let format = ExportFormat::from_path(path)?;
    let bytes = export(svg, format)?;
    std::fs::write(path, &bytes)?;
    info!(
        path = %path.display(),
        format = format.extension(),
        bytes = bytes.len(),
        "Diagram exported"
    );
    Ok(format)
}

/// In-process Mermaid renderer.
#[cfg(feature = "mermaid")]
#[derive(Debug, Clone, Default)]
pub struct MermaidSvgRenderer {
    config: mermaid_rs_renderer::config::Config,
}

#[cfg(feature = "mermaid")]
impl DiagramRenderer for MermaidSvgRenderer {
    fn render(&self, source: &str) -> Result<String, RenderError> {
        use mermaid_rs_renderer::{layout::compute_layout, parser::parse_mermaid, render::render_svg};

        let parsed = parse_mermaid(source).map_err(|e| RenderError::Diagram {
            message: e.to_string(),
        })?;
        let layout = compute_layout(&parsed.graph, &self.config.theme, &self.config.layout);
        Ok(render_svg(&layout, &self.config.theme, &self.config.layout))
    }
}
