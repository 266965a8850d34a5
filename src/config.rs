// Search Service Configuration
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,

    // Search service connection
    pub search_scheme: String,
    pub search_hostname: String,
    pub search_port: u16,
    pub documents_index: String,
    pub images_index: String,
    pub text_model_id: Option<String>,
    pub search_limit: usize,

    // Cloud region, shared by the search connection and URL signing
    pub region: String,

    // Embedding inference service
    pub embeddings_url: String,
    pub max_embedding_input_chars: usize,

    // Object storage credentials for presigning
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub presign_expiry_secs: u64,

    // Timeouts
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,

            // Search service
            search_scheme: std::env::var("SEARCH_SCHEME").unwrap_or_else(|_| "https".to_string()),
            search_hostname: std::env::var("SEARCH_HOSTNAME")
                .unwrap_or_else(|_| "localhost".to_string()),
            search_port: std::env::var("SEARCH_PORT")
                .unwrap_or_else(|_| "443".to_string())
                .parse()?,
            documents_index: std::env::var("DOCUMENTS_INDEX")
                .unwrap_or_else(|_| "text-vectors".to_string()),
            images_index: std::env::var("IMAGES_INDEX")
                .unwrap_or_else(|_| "image-vectors".to_string()),
            text_model_id: std::env::var("TEXT_MODEL_ID").ok(),
            search_limit: std::env::var("SEARCH_LIMIT")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,

            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),

            // Embedding service
            embeddings_url: std::env::var("EMBEDDINGS_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            max_embedding_input_chars: std::env::var("MAX_EMBEDDING_INPUT_CHARS")
                .unwrap_or_else(|_| "512".to_string())
                .parse()?,

            // Presigning
            access_key_id: std::env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
            session_token: std::env::var("AWS_SESSION_TOKEN").ok(),
            presign_expiry_secs: std::env::var("PRESIGN_EXPIRY_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()?,

            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        })
    }

    /// Base URL of the search service, e.g. `https://search.example.com:443`.
    pub fn search_base_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.search_scheme, self.search_hostname, self.search_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn base_url_joins_scheme_host_and_port() {
        let config = Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            search_scheme: "https".to_string(),
            search_hostname: "search.example.com".to_string(),
            search_port: 9200,
            documents_index: "text-vectors".to_string(),
            images_index: "image-vectors".to_string(),
            text_model_id: None,
            search_limit: 20,
            region: "eu-west-1".to_string(),
            embeddings_url: "http://localhost:8000".to_string(),
            max_embedding_input_chars: 512,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            presign_expiry_secs: 3600,
            request_timeout_secs: 30,
        };
        assert_eq!(config.search_base_url(), "https://search.example.com:9200");
    }
}
