// Embedding Provider - Access to the text embedding inference service
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, ApiResult};

/// Interface over the embedding model. Production traffic goes to an HTTP
/// inference service; tests substitute an in-memory implementation.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text into a fixed-length vector.
    async fn embed(&self, text: &str) -> ApiResult<Vec<f32>>;
}

pub struct HttpEmbeddingProvider {
    base_url: String,
    client: reqwest::Client,
    max_input_chars: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl HttpEmbeddingProvider {
    pub fn new(
        base_url: String,
        max_input_chars: usize,
        timeout: std::time::Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
            max_input_chars,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> ApiResult<Vec<f32>> {
        // The model has a hard context limit; reject oversized input here so
        // the caller gets a structured error instead of a provider fault.
        let chars = text.chars().count();
        if chars > self.max_input_chars {
            return Err(ApiError::EmbeddingTooLong(format!(
                "input is {} characters, maximum is {}",
                chars, self.max_input_chars
            )));
        }

        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(&EmbedRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| ApiError::EmbeddingUpstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::InvalidInput(format!(
                "embedding provider rejected input ({}): {}",
                status, body
            )));
        }
        if !status.is_success() {
            return Err(ApiError::EmbeddingUpstream(format!(
                "embedding provider returned {}",
                status
            )));
        }

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ApiError::EmbeddingUpstream(format!("failed to parse response: {}", e)))?;

        Ok(result.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_input_is_a_caller_error() {
        let provider = HttpEmbeddingProvider::new(
            "http://localhost:8000".to_string(),
            8,
            std::time::Duration::from_secs(1),
        )
        .unwrap();

        let err = tokio_test::block_on(provider.embed("definitely more than eight chars"))
            .unwrap_err();
        assert!(matches!(err, ApiError::EmbeddingTooLong(_)));
    }

    #[test]
    fn length_check_counts_characters_not_bytes() {
        let provider = HttpEmbeddingProvider::new(
            "http://127.0.0.1:9".to_string(),
            4,
            std::time::Duration::from_secs(1),
        )
        .unwrap();

        // Four characters, more than four bytes. Must pass the length check
        // (and then fail on the unreachable provider, which is fine here).
        let err = tokio_test::block_on(provider.embed("çççç")).unwrap_err();
        assert!(matches!(err, ApiError::EmbeddingUpstream(_)));
    }
}
