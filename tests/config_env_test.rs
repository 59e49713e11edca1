//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Config::from_env() also loads a .env file
//! via dotenvy, so each test sets what it asserts on and clears it afterwards.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use geo_proof_tutor::config::{Config, LogFormat, DEFAULT_MODEL_CANDIDATES};
use geo_proof_tutor::AppError;
use serial_test::serial;
use std::env;

fn clear(keys: &[&str]) {
    for key in keys {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
    clear(&["MODEL_CANDIDATES", "REQUEST_TIMEOUT_MS", "DIAGRAM_WRAP_WIDTH"]);

    let config = Config::from_env().unwrap();
    assert_eq!(config.model.candidates, DEFAULT_MODEL_CANDIDATES);
    assert_eq!(config.request.timeout_ms, 120_000);
    assert_eq!(config.diagram.wrap_width, 28);
}

#[test]
#[serial]
fn test_config_from_env_custom_base_url() {
    env::set_var("GEMINI_BASE_URL", "https://custom.api.com");

    let config = Config::from_env().unwrap();
    assert_eq!(config.model.base_url, "https://custom.api.com");

    clear(&["GEMINI_BASE_URL"]);
}

#[test]
#[serial]
fn test_config_from_env_candidates_in_order() {
    env::set_var("MODEL_CANDIDATES", " model-b , model-a,, model-c ");

    let config = Config::from_env().unwrap();
    assert_eq!(config.model.candidates, vec!["model-b", "model-a", "model-c"]);

    clear(&["MODEL_CANDIDATES"]);
}

#[test]
#[serial]
fn test_config_from_env_empty_candidates_is_error() {
    env::set_var("MODEL_CANDIDATES", " , ");

    let result = Config::from_env();
    assert!(matches!(result, Err(AppError::Config { .. })));

    clear(&["MODEL_CANDIDATES"]);
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    env::set_var("LOG_FORMAT", "json");
    env::set_var("LOG_LEVEL", "debug");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.logging.level, "debug");

    clear(&["LOG_FORMAT", "LOG_LEVEL"]);
}

#[test]
#[serial]
fn test_config_from_env_unbounded_timeout() {
    env::set_var("REQUEST_TIMEOUT_MS", "0");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 0);

    clear(&["REQUEST_TIMEOUT_MS"]);
}

#[test]
#[serial]
fn test_config_invalid_number_is_error() {
    env::set_var("REQUEST_TIMEOUT_MS", "soon");

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("REQUEST_TIMEOUT_MS"));

    clear(&["REQUEST_TIMEOUT_MS"]);
}

#[test]
#[serial]
fn test_config_from_env_diagram_flags() {
    env::set_var("DIAGRAM_SHOW_METHOD", "yes");
    env::set_var("DIAGRAM_PROOF_ARROWS", "off");
    env::set_var("DIAGRAM_METHOD_MAX_LEN", "12");

    let config = Config::from_env().unwrap();
    assert!(config.diagram.show_method);
    assert!(config.diagram.analysis_arrows);
    assert!(!config.diagram.proof_arrows);
    assert_eq!(config.diagram.method_max_len, 12);

    clear(&[
        "DIAGRAM_SHOW_METHOD",
        "DIAGRAM_PROOF_ARROWS",
        "DIAGRAM_METHOD_MAX_LEN",
    ]);
}

#[test]
#[serial]
fn test_config_zero_wrap_width_is_error() {
    env::set_var("DIAGRAM_WRAP_WIDTH", "0");

    assert!(Config::from_env().is_err());

    clear(&["DIAGRAM_WRAP_WIDTH"]);
}

#[test]
#[serial]
fn test_api_key_override_and_redaction() {
    env::set_var("GEMINI_API_KEY", "env-secret");

    let config = Config::from_env().unwrap();
    assert_eq!(config.model.api_key.as_deref(), Some("env-secret"));
    assert!(!format!("{:?}", config).contains("env-secret"));

    let model = config.model.with_api_key_override(Some("user-secret".to_string()));
    assert_eq!(model.api_key.as_deref(), Some("user-secret"));

    clear(&["GEMINI_API_KEY"]);
}
