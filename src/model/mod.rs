//! Model backend seam and the HTTP client that implements it.
//!
//! The pipeline only sees [`ModelBackend`]; [`ModelClient`] is the
//! production implementation speaking the `generateContent` REST API.

mod client;
mod types;


pub use client::ModelClient;
pub use types::*;

use async_trait::async_trait;

use crate::error::ModelResult;

/// A text generator reachable over the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Whether a credential is available; checked before any call is made.
    fn has_credential(&self) -> bool;

    /// Run one request against the named model and return its raw text.
    async fn complete(&self, model: &str, request: &GenerateRequest) -> ModelResult<String>;
}
