//! Port for the external text-generation API used by the ROI projection
//! endpoint. The concrete implementation lives in `infra::cohere_client`;
//! projections must degrade to the arithmetic path when a call fails, so
//! errors from this port are never surfaced to the end user.

use async_trait::async_trait;

use crate::app_error::AppResult;

#[async_trait]
pub trait TextGenerationPort: Send + Sync {
    /// Send a prompt and return the raw free-text reply.
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}
