//! # Geo Proof Tutor
//!
//! Core of a plane-geometry proof tutor. A language model is asked for a
//! backward-reasoning proof tree; this crate requests it, repairs and
//! sanitizes whatever comes back, and turns it into an explorable map, a
//! Mermaid flowchart and a written proof.
//!
//! ## Features
//!
//! - **Response pipeline**: ordered multi-model fallback, JSON extraction from
//!   noisy text, backslash repair for raw LaTeX, total tree sanitization
//! - **Math segmentation**: mixed prose/math strings split into text, bold,
//!   inline and block math, with canonical angle and degree notation
//! - **Diagram compiler**: deterministic Mermaid source with per-edge
//!   direction and styling, SVG/PNG export
//! - **Session state**: request tickets that discard stale completions, map
//!   expansion and selection
//!
//! ## Architecture
//!
//! ```text
//! AnalysisRequest → Gateway → ModelBackend (HTTP, per candidate)
//!                     ↓
//!        extract_json → parse_json_lenient → sanitize
//!                     ↓
//!              GeometryResponse → diagram::compile / MapState / report
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use geo_proof_tutor::{Config, Gateway, ModelClient, AnalysisRequest};
//! use geo_proof_tutor::diagram::{compile, DiagramOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = ModelClient::new(&config.model, config.request.clone())?;
//!     let gateway = Gateway::new(client, config.model.candidates.clone());
//!     let response = gateway.analyze(&AnalysisRequest::new("Prove AM ⊥ BC")).await?;
//!     let options = DiagramOptions::from(&config.diagram);
//!     println!("{}", compile(Some(&response.branches[0].root), &options));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration loaded from the environment.
pub mod config;
/// Proof tree to Mermaid compilation, rendering and export.
pub mod diagram;
/// Error types and result aliases for the application.
pub mod error;
/// Math segmentation, normalization and rendering.
pub mod math;
/// Model backend trait, wire types and HTTP client.
pub mod model;
/// Request building, JSON repair and multi-model fallback.
pub mod pipeline;
/// Interactive map expansion and selection state.
pub mod presenter;
/// Instruction text sent to the model.
pub mod prompts;
/// Plain-text report of an answer.
pub mod report;
/// Session state and stale-request handling.
pub mod session;
/// Proof tree types and the sanitizer.
pub mod tree;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use model::{ModelBackend, ModelClient};
pub use pipeline::{AnalysisRequest, Gateway};
pub use session::Session;
pub use tree::{GeometryResponse, LogicNode};
