//! OpenSearch REST client
//!
//! Executes semantic queries against the managed search service and performs
//! bulk index wipes. Text queries use the service-hosted text model when one
//! is configured; image queries embed the search text client-side and run a
//! k-NN query over the image vector field.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::client::{DocumentHit, ImageHit, SearchClient};
use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::errors::{ApiError, ApiResult};

pub struct OpenSearchClient {
    client: reqwest::Client,
    base_url: String,
    documents_index: String,
    images_index: String,
    text_model_id: Option<String>,
    limit: usize,
    embedder: Arc<dyn EmbeddingProvider>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_score", default)]
    score: f32,
    #[serde(rename = "_source")]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    deleted: u64,
}

impl OpenSearchClient {
    pub fn new(config: &Config, embedder: Arc<dyn EmbeddingProvider>) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
                .build()?,
            base_url: config.search_base_url(),
            documents_index: config.documents_index.clone(),
            images_index: config.images_index.clone(),
            text_model_id: config.text_model_id.clone(),
            limit: config.search_limit,
            embedder,
        })
    }

    async fn run_search(&self, index: &str, body: Value) -> ApiResult<Vec<Hit>> {
        let url = format!("{}/{}/_search", self.base_url, index);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::SearchUpstream(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::SearchUpstream(format!(
                "search service returned {}",
                response.status()
            )));
        }

        let result: SearchResponse = response
            .json()
            .await
            .map_err(|e| ApiError::SearchUpstream(format!("failed to parse response: {}", e)))?;

        Ok(result.hits.hits)
    }

    fn text_query(&self, query: &str) -> Value {
        match &self.text_model_id {
            // Hosted text model: the service embeds the query itself.
            Some(model_id) => json!({
                "size": self.limit,
                "query": {
                    "neural": {
                        "embeddings": {
                            "query_text": query,
                            "model_id": model_id,
                            "k": self.limit,
                        }
                    }
                }
            }),
            // Lexical fallback when no hosted model is configured.
            None => json!({
                "size": self.limit,
                "query": {
                    "multi_match": { "query": query }
                }
            }),
        }
    }
}

#[async_trait]
impl SearchClient for OpenSearchClient {
    async fn search_documents(&self, query: &str) -> ApiResult<Vec<DocumentHit>> {
        let hits = self
            .run_search(&self.documents_index, self.text_query(query))
            .await?;
        parse_document_hits(hits)
    }

    async fn search_images(&self, query: &str) -> ApiResult<Vec<ImageHit>> {
        let vector = self.embedder.embed(query).await?;
        let body = json!({
            "size": self.limit,
            "query": {
                "knn": {
                    "embeddings": {
                        "vector": vector,
                        "k": self.limit,
                    }
                }
            }
        });
        let hits = self.run_search(&self.images_index, body).await?;
        parse_image_hits(hits)
    }

    async fn delete_documents(&self) -> ApiResult<u64> {
        self.delete_all(&self.documents_index).await
    }

    async fn delete_images(&self) -> ApiResult<u64> {
        self.delete_all(&self.images_index).await
    }
}

impl OpenSearchClient {
    async fn delete_all(&self, index: &str) -> ApiResult<u64> {
        let url = format!("{}/{}/_delete_by_query", self.base_url, index);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "query": { "match_all": {} } }))
            .send()
            .await
            .map_err(|e| ApiError::SearchUpstream(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ApiError::SearchUpstream(format!(
                "search service returned {}",
                response.status()
            )));
        }

        let result: DeleteByQueryResponse = response
            .json()
            .await
            .map_err(|e| ApiError::SearchUpstream(format!("failed to parse response: {}", e)))?;

        Ok(result.deleted)
    }
}

/// Documents are stored with a `source` object and extracted `metadata`.
fn parse_document_hits(hits: Vec<Hit>) -> ApiResult<Vec<DocumentHit>> {
    hits.into_iter()
        .map(|hit| {
            let mut doc: DocumentHit = serde_json::from_value(hit.source)
                .map_err(|e| ApiError::SearchUpstream(format!("malformed document hit: {}", e)))?;
            doc.score = hit.score;
            Ok(doc)
        })
        .collect()
}

/// Images carry their backing object under `data.document.url`.
fn parse_image_hits(hits: Vec<Hit>) -> ApiResult<Vec<ImageHit>> {
    hits.into_iter()
        .map(|hit| {
            let url = hit
                .source
                .pointer("/data/document/url")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ApiError::SearchUpstream("image hit missing data.document.url".to_string())
                })?;
            Ok(ImageHit {
                url: url.to_string(),
                score: hit.score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_hits_keep_source_metadata_and_score() {
        let hits = vec![Hit {
            score: 0.92,
            source: json!({
                "source": { "url": "s3://bucket/docs/report.pdf", "type": "application/pdf" },
                "metadata": { "title": "Quarterly Report" }
            }),
        }];

        let docs = parse_document_hits(hits).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source.url, "s3://bucket/docs/report.pdf");
        assert_eq!(docs[0].metadata["title"], "Quarterly Report");
        assert_eq!(docs[0].score, 0.92);
    }

    #[test]
    fn document_hit_without_source_url_is_an_upstream_error() {
        let hits = vec![Hit {
            score: 0.5,
            source: json!({ "metadata": {} }),
        }];
        assert!(matches!(
            parse_document_hits(hits),
            Err(ApiError::SearchUpstream(_))
        ));
    }

    #[test]
    fn image_hits_read_the_nested_document_url() {
        let hits = vec![Hit {
            score: 0.8,
            source: json!({
                "data": { "document": { "url": "s3://bucket/photos/sunset.jpg" } }
            }),
        }];

        let images = parse_image_hits(hits).unwrap();
        assert_eq!(images[0].url, "s3://bucket/photos/sunset.jpg");
        assert_eq!(images[0].score, 0.8);
    }

    #[test]
    fn image_hit_without_url_is_an_upstream_error() {
        let hits = vec![Hit {
            score: 0.8,
            source: json!({ "data": { "document": {} } }),
        }];
        assert!(matches!(
            parse_image_hits(hits),
            Err(ApiError::SearchUpstream(_))
        ));
    }
}
