//! The response pipeline between the model backend and the proof tree.
//!
//! ```text
//! AnalysisRequest → build_generate_request → ModelBackend (per candidate)
//!     → extract_json → parse_json_lenient → normalize_response → GeometryResponse
//! ```

mod extract;
mod gateway;
mod request;
mod response;

pub use extract::{extract_json, parse_json_lenient, repair_backslashes};
pub use gateway::Gateway;
pub use request::{build_generate_request, build_instruction, AnalysisRequest};
pub use response::{normalize_response, parse_model_output, MISSING_PROOF};
