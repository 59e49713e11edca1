use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or unparsable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Model client setup or call failure
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Analysis did not produce a usable response
    #[error("Analysis failed: {0}")]
    Pipeline(#[from] PipelineError),

    /// Math or diagram rendering failure
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Diagram export failure
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// Model backend errors (one candidate, one call)
#[derive(Debug, Error)]
pub enum ModelError {
    /// Non-success HTTP status from the API
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The model answered with no text
    #[error("Empty response from model {model}")]
    EmptyResponse {
        /// Model identifier
        model: String,
    },

    /// The response body did not match the wire format
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Decode error
        message: String,
    },

    /// The call exceeded the configured timeout
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout
        timeout_ms: u64,
    },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Response pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither problem text nor an image was supplied
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was missing
        message: String,
    },

    /// No API key is available
    #[error("Missing API key: supply one with --api-key or set GEMINI_API_KEY")]
    MissingCredential,

    /// The model text contains no JSON object
    #[error("No JSON object found in model output: '{preview}'")]
    NoJsonFound {
        /// Leading part of the model text
        preview: String,
    },

    /// The JSON candidate failed to parse even after repair
    #[error("JSON syntax error: {message}")]
    JsonSyntax {
        /// Parser error from the unrepaired text
        message: String,
    },

    /// Valid JSON with no usable branch
    #[error("No diagram found in model response")]
    NoDiagram,

    /// Backend call failure
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Every candidate model failed
    #[error("All {attempts} model candidates failed; last error: {message}")]
    Exhausted {
        /// Number of candidates tried
        attempts: usize,
        /// Last observed error
        message: String,
    },
}

/// Typesetting and diagram rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// One math segment could not be typeset
    #[error("Math render failed for '{source_text}': {message}")]
    Math {
        /// The math source as written
        source_text: String,
        /// Why it failed
        message: String,
    },

    /// The diagram engine rejected the source
    #[error("Diagram render failed: {message}")]
    Diagram {
        /// Engine error
        message: String,
    },
}

/// Diagram export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// The SVG could not be parsed
    #[error("Invalid SVG: {message}")]
    InvalidSvg {
        /// Parser error
        message: String,
    },

    /// Rasterizing or PNG encoding failed
    #[error("Rasterization failed: {message}")]
    Rasterize {
        /// Failure detail
        message: String,
    },

    /// Unknown target extension, or PNG without the `png` feature
    #[error("Unsupported export format: {format}")]
    Unsupported {
        /// Requested format
        format: String,
    },

    /// Writing the output file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for model backend calls
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
