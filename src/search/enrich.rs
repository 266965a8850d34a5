//! Result enrichment
//!
//! Pure step between the search client and the view layer: attaches a
//! presigned URL and a display title to each hit. Enrichment never mutates
//! a hit, and raw storage URLs never reach a caller.

use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::Value;

use super::client::{DocumentHit, ImageHit};
use crate::errors::ApiResult;
use crate::storage::UrlSigner;

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedDocument {
    pub title: String,
    pub presigned_url: String,
    pub score: f32,
    pub metadata: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedImage {
    pub presigned_url: String,
    pub score: f32,
}

pub fn enrich_document(hit: &DocumentHit, signer: &UrlSigner) -> ApiResult<EnrichedDocument> {
    Ok(EnrichedDocument {
        title: display_title(&hit.metadata, &hit.source.url),
        presigned_url: signer.presign(&hit.source.url)?,
        score: hit.score,
        metadata: hit.metadata.clone(),
    })
}

pub fn enrich_image(hit: &ImageHit, signer: &UrlSigner) -> ApiResult<EnrichedImage> {
    Ok(EnrichedImage {
        presigned_url: signer.presign(&hit.url)?,
        score: hit.score,
    })
}

/// Prefer the extracted metadata title; otherwise fall back to the
/// percent-decoded final path segment of the object URL.
fn display_title(metadata: &Value, url: &str) -> String {
    if let Some(title) = metadata.get("title").and_then(Value::as_str) {
        if !title.trim().is_empty() {
            return title.to_string();
        }
    }

    let segment = url.rsplit('/').next().unwrap_or(url);
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}
