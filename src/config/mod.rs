use std::env;
use std::fmt;

use crate::error::AppError;

/// Default ordered list of model candidates tried by the gateway.
pub const DEFAULT_MODEL_CANDIDATES: &[&str] =
    &["gemini-2.5-flash", "gemini-2.5-pro", "gemini-2.0-flash"];

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Model backend settings
    pub model: ModelConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// HTTP request settings
    pub request: RequestConfig,
    /// Diagram compiler defaults
    pub diagram: DiagramConfig,
}

/// Model backend configuration
#[derive(Clone)]
pub struct ModelConfig {
    /// Model-access key; never logged
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Model identifiers in priority order
    pub candidates: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable output
    Pretty,
    /// One JSON object per line
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Per-call timeout; `0` leaves calls unbounded.
    pub timeout_ms: u64,
}

/// Diagram compiler defaults
#[derive(Debug, Clone)]
pub struct DiagramConfig {
    /// Label wrap width in characters
    pub wrap_width: usize,
    /// Longest method shown under a label
    pub method_max_len: usize,
    /// Show the `[method]` line
    pub show_method: bool,
    /// Draw parent-to-child arrows
    pub analysis_arrows: bool,
    /// Draw child-to-parent arrows
    pub proof_arrows: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let candidates = match env::var("MODEL_CANDIDATES") {
            Ok(raw) => {
                let list: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if list.is_empty() {
                    return Err(AppError::Config {
                        message: "MODEL_CANDIDATES must name at least one model".to_string(),
                    });
                }
                list
            }
            Err(_) => DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let model = ModelConfig {
            api_key: env::var("GEMINI_API_KEY")
                .or_else(|_| env::var("API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty()),
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            candidates,
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: parse_var("REQUEST_TIMEOUT_MS")?.unwrap_or(120_000),
        };

        let defaults = DiagramConfig::default();
        let diagram = DiagramConfig {
            wrap_width: parse_var("DIAGRAM_WRAP_WIDTH")?.unwrap_or(defaults.wrap_width),
            method_max_len: parse_var("DIAGRAM_METHOD_MAX_LEN")?
                .unwrap_or(defaults.method_max_len),
            show_method: parse_flag("DIAGRAM_SHOW_METHOD")?.unwrap_or(defaults.show_method),
            analysis_arrows: parse_flag("DIAGRAM_ANALYSIS_ARROWS")?
                .unwrap_or(defaults.analysis_arrows),
            proof_arrows: parse_flag("DIAGRAM_PROOF_ARROWS")?.unwrap_or(defaults.proof_arrows),
        };

        if diagram.wrap_width == 0 {
            return Err(AppError::Config {
                message: "DIAGRAM_WRAP_WIDTH must be greater than zero".to_string(),
            });
        }

        Ok(Config {
            model,
            logging,
            request,
            diagram,
        })
    }
}

impl ModelConfig {
    /// Replace the environment credential with a user-supplied one.
    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("candidates", &self.candidates)
            .finish()
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 120_000 }
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            wrap_width: 28,
            method_max_len: 40,
            show_method: false,
            analysis_arrows: true,
            proof_arrows: true,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, AppError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| AppError::Config {
            message: format!("{} has an invalid value: '{}'", key, raw),
        }),
        Err(_) => Ok(None),
    }
}

fn parse_flag(key: &str) -> Result<Option<bool>, AppError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(AppError::Config {
                message: format!("{} must be a boolean, got '{}'", key, raw),
            }),
        },
        Err(_) => Ok(None),
    }
}
