// Search Client Trait - Common interface to the search service
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ApiResult;

/// One text-search hit, as stored by the ingestion pipeline: `source`
/// describes the backing object, `metadata` carries extracted fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHit {
    pub source: DocumentSource,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSource {
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One image-search hit; only the backing object URL matters downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageHit {
    pub url: String,
    #[serde(default)]
    pub score: f32,
}

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Semantic search over the document index.
    async fn search_documents(&self, query: &str) -> ApiResult<Vec<DocumentHit>>;

    /// Semantic search over the image index.
    async fn search_images(&self, query: &str) -> ApiResult<Vec<ImageHit>>;

    /// Wipe the document index. Returns the number of deleted documents.
    async fn delete_documents(&self) -> ApiResult<u64>;

    /// Wipe the image index. Returns the number of deleted images.
    async fn delete_images(&self) -> ApiResult<u64>;
}
