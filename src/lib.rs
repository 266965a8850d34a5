// Search Service - Semantic search front end
// Exposes text and image search over a managed search index, bulk index
// deletion, and a text embedding endpoint; results are enriched with
// presigned object-storage URLs before rendering.

pub mod api;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod search;
pub mod storage;
pub mod views;

pub use config::Config;
pub use errors::{ApiError, ApiResult};
