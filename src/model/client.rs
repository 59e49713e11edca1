use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::types::{GenerateRequest, GenerateResponse};
use super::ModelBackend;
use crate::config::{ModelConfig, RequestConfig};
use crate::error::{ModelError, ModelResult};

/// Client for the `generateContent` REST API
#[derive(Clone)]
pub struct ModelClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    request_config: RequestConfig,
}

impl ModelClient {
    /// Create a new model client
    pub fn new(config: &ModelConfig, request_config: RequestConfig) -> ModelResult<Self> {
        let mut builder = Client::builder();
        if request_config.timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(request_config.timeout_ms));
        }
        let client = builder.build().map_err(ModelError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Call `generateContent` on one model
    pub async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> ModelResult<GenerateResponse> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let api_key = self.api_key.as_deref().unwrap_or_default();

        debug!(
            model = %model,
            parts = request.parts().count(),
            "Calling model backend"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    ModelError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let generate_response: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| ModelError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        info!(
            model = %model,
            latency_ms = start.elapsed().as_millis(),
            candidates = generate_response.candidates.len(),
            "Model call succeeded"
        );

        Ok(generate_response)
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ModelBackend for ModelClient {
    fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    async fn complete(&self, model: &str, request: &GenerateRequest) -> ModelResult<String> {
        let text = self.generate(model, request).await?.text();
        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse {
                model: model.to_string(),
            });
        }
        Ok(text)
    }
}
