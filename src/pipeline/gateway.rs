use std::time::Instant;
use tracing::{info, warn};

use super::request::{build_generate_request, AnalysisRequest};
use super::response::parse_model_output;
use crate::config::Config;
use crate::error::{AppResult, PipelineError, PipelineResult};
use crate::model::{ModelBackend, ModelClient};
use crate::tree::GeometryResponse;

/// Drives one analysis across the ordered list of candidate models.
///
/// Candidates are tried strictly one after another; the first structurally
/// usable answer wins and no later candidate is called.
pub struct Gateway<B: ModelBackend> {
    backend: B,
    candidates: Vec<String>,
}

impl<B: ModelBackend> Gateway<B> {
    /// Create a gateway over a backend and a priority-ordered candidate list
    pub fn new(backend: B, candidates: Vec<String>) -> Self {
        Self {
            backend,
            candidates,
        }
    }

    /// Candidate model identifiers, in priority order
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Analyze a problem, falling back through the candidates on failure.
    pub async fn analyze(&self, request: &AnalysisRequest) -> PipelineResult<GeometryResponse> {
        request.validate()?;

        if !self.backend.has_credential() {
            return Err(PipelineError::MissingCredential);
        }

        let payload = build_generate_request(request);
        let mut last_error: Option<PipelineError> = None;

        for (attempt, model) in self.candidates.iter().enumerate() {
            let start = Instant::now();
            info!(
                model = %model,
                attempt = attempt + 1,
                refinement = request.refinement().is_some(),
                "Requesting analysis"
            );

            let outcome = match self.backend.complete(model, &payload).await {
                Ok(text) => parse_model_output(&text),
                Err(e) => Err(PipelineError::Model(e)),
            };

            match outcome {
                Ok(response) => {
                    info!(
                        model = %model,
                        branches = response.branches.len(),
                        latency_ms = start.elapsed().as_millis(),
                        "Analysis succeeded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    warn!(
                        model = %model,
                        error = %e,
                        latency_ms = start.elapsed().as_millis(),
                        "Candidate model failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(PipelineError::Exhausted {
            attempts: self.candidates.len(),
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no model candidates configured".to_string()),
        })
    }
}

impl Gateway<ModelClient> {
    /// Build the HTTP-backed gateway from configuration.
    ///
    /// A key given here takes precedence over the configured one.
    pub fn from_config(config: &Config, api_key_override: Option<String>) -> AppResult<Self> {
        let model_config = config.model.clone().with_api_key_override(api_key_override);
        let client = ModelClient::new(&model_config, config.request.clone())?;
        info!(
            base_url = %client.base_url(),
            candidates = model_config.candidates.len(),
            "Model client initialized"
        );
        Ok(Self::new(client, model_config.candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiagramConfig, LogFormat, LoggingConfig, ModelConfig, RequestConfig};
    use crate::error::ModelError;
    use crate::model::MockModelBackend;
    use crate::tree::NodeType;
    use mockall::Sequence;

    const VALID: &str = r#"{"conclusion": "goal", "branches": [{"name": "a", "root": {"id": "r", "statement": "goal", "type": "NODE", "children": [{"id": "h", "statement": "fact", "type": "LEAF"}]}}]}"#;

    fn candidates() -> Vec<String> {
        vec!["m1".to_string(), "m2".to_string(), "m3".to_string()]
    }

    #[tokio::test]
    async fn test_falls_back_in_priority_order() {
        let mut backend = MockModelBackend::new();
        let mut seq = Sequence::new();
        backend.expect_has_credential().return_const(true);
        backend
            .expect_complete()
            .withf(|model, _| model == "m1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Err(ModelError::Api {
                    status: 503,
                    message: "overloaded".to_string(),
                })
            });
        backend
            .expect_complete()
            .withf(|model, _| model == "m2")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("Sorry, I cannot help with that.".to_string()));
        backend
            .expect_complete()
            .withf(|model, _| model == "m3")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(VALID.to_string()));

        let gateway = Gateway::new(backend, candidates());
        let response = gateway
            .analyze(&AnalysisRequest::new("Prove the goal"))
            .await
            .unwrap();

        assert_eq!(response.branches.len(), 1);
        assert_eq!(response.branches[0].root.node_type, NodeType::Root);
        assert_eq!(response.branches[0].root.node_count(), 2);
    }

    #[tokio::test]
    async fn test_stops_after_first_success() {
        let mut backend = MockModelBackend::new();
        backend.expect_has_credential().return_const(true);
        backend
            .expect_complete()
            .withf(|model, _| model == "m1")
            .times(1)
            .returning(|_, _| Ok(VALID.to_string()));
        backend
            .expect_complete()
            .withf(|model, _| model != "m1")
            .times(0);

        let gateway = Gateway::new(backend, candidates());
        assert!(gateway.analyze(&AnalysisRequest::new("x")).await.is_ok());
    }

    #[tokio::test]
    async fn test_exhaustion_reports_last_error() {
        let mut backend = MockModelBackend::new();
        backend.expect_has_credential().return_const(true);
        backend
            .expect_complete()
            .withf(|model, _| model != "m3")
            .times(2)
            .returning(|model, _| {
                Err(ModelError::EmptyResponse {
                    model: model.to_string(),
                })
            });
        backend
            .expect_complete()
            .withf(|model, _| model == "m3")
            .times(1)
            .returning(|_, _| Ok(r#"{"branches": []}"#.to_string()));

        let gateway = Gateway::new(backend, candidates());
        let err = gateway.analyze(&AnalysisRequest::new("x")).await.unwrap_err();

        match err {
            PipelineError::Exhausted { attempts, message } => {
                assert_eq!(attempts, 3);
                assert!(message.contains("No diagram found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        let mut backend = MockModelBackend::new();
        backend.expect_has_credential().return_const(false);
        backend.expect_complete().times(0);

        let gateway = Gateway::new(backend, candidates());
        let err = gateway.analyze(&AnalysisRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingCredential));
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_call() {
        let mut backend = MockModelBackend::new();
        backend.expect_has_credential().return_const(true);
        backend.expect_complete().times(0);

        let gateway = Gateway::new(backend, candidates());
        let err = gateway.analyze(&AnalysisRequest::new("  ")).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
    }

    #[test]
    fn test_from_config_uses_override_and_candidates() {
        let config = Config {
            model: ModelConfig {
                api_key: None,
                base_url: "http://localhost:9".to_string(),
                candidates: vec!["a".to_string(), "b".to_string()],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
            request: RequestConfig::default(),
            diagram: DiagramConfig::default(),
        };

        let gateway = Gateway::from_config(&config, Some("user-key".to_string())).unwrap();
        assert_eq!(gateway.candidates(), ["a".to_string(), "b".to_string()]);
        assert!(gateway.backend().has_credential());

        let without_key = Gateway::from_config(&config, None).unwrap();
        assert!(!without_key.backend().has_credential());
    }

    #[test]
    fn test_no_candidates() {
        let mut backend = MockModelBackend::new();
        backend.expect_has_credential().return_const(true);

        let gateway = Gateway::new(backend, Vec::new());
        let err = tokio_test::block_on(gateway.analyze(&AnalysisRequest::new("x"))).unwrap_err();
        assert!(err.to_string().contains("no model candidates configured"));
    }
}
