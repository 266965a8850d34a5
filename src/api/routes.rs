//! HTTP endpoint handlers
//!
//! Each handler is a stateless function of its request: extract parameters,
//! call the shared clients, run the pure enrichment step, render or return
//! JSON. All downstream faults surface as typed `ApiError` responses.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tera::Context;
use tracing::{info, warn};

use crate::embeddings::EmbeddingProvider;
use crate::errors::{ApiError, ApiResult};
use crate::search::{enrich_document, enrich_image, SearchClient};
use crate::storage::UrlSigner;
use crate::views::Views;

/// Process-wide shared state, constructed once at startup.
pub struct AppState {
    pub search: Arc<dyn SearchClient>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub signer: Arc<UrlSigner>,
    pub views: Arc<Views>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

fn require_query(q: Option<String>) -> ApiResult<String> {
    match q {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => Err(ApiError::InvalidQuery(
            "missing or blank 'q' parameter".to_string(),
        )),
    }
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

async fn index(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    Ok(html(state.views.render("index.html", &Context::new())?))
}

async fn search_documents(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    let query = require_query(params.into_inner().q)?;
    info!(query = %query, "document search");

    let hits = state.search.search_documents(&query).await?;
    let results = hits
        .iter()
        .map(|hit| enrich_document(hit, &state.signer))
        .collect::<ApiResult<Vec<_>>>()?;

    info!(query = %query, results = results.len(), "document search completed");

    let mut context = Context::new();
    context.insert("query", &query);
    context.insert("results", &results);
    Ok(html(state.views.render("search.html", &context)?))
}

async fn search_images(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> ApiResult<HttpResponse> {
    let query = require_query(params.into_inner().q)?;
    info!(query = %query, "image search");

    let hits = state.search.search_images(&query).await?;
    let results = hits
        .iter()
        .map(|hit| enrich_image(hit, &state.signer))
        .collect::<ApiResult<Vec<_>>>()?;

    info!(query = %query, results = results.len(), "image search completed");

    let mut context = Context::new();
    context.insert("query", &query);
    context.insert("results", &results);
    Ok(html(state.views.render("image-search.html", &context)?))
}

async fn delete_documents(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    warn!("wiping the document index");
    let deleted = state.search.delete_documents().await?;
    info!(deleted, "document index wiped");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": deleted })))
}

async fn delete_images(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    warn!("wiping the image index");
    let deleted = state.search.delete_images().await?;
    info!(deleted, "image index wiped");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": deleted })))
}

async fn post_embedding(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let text = std::str::from_utf8(&body)
        .map_err(|_| ApiError::InvalidInput("request body is not valid UTF-8".to_string()))?;

    let embedding = state.embedder.embed(text).await?;
    info!(dimension = embedding.len(), "embedding computed");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "embedding": embedding })))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "search-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/search", web::get().to(search_documents))
        .route("/search/images", web::get().to(search_images))
        .route("/documents", web::delete().to(delete_documents))
        .route("/images", web::delete().to(delete_images))
        .route("/embedding", web::post().to(post_embedding))
        .route("/health", web::get().to(health));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_is_required_and_must_not_be_blank() {
        assert!(require_query(None).is_err());
        assert!(require_query(Some("".to_string())).is_err());
        assert!(require_query(Some("   ".to_string())).is_err());
        assert_eq!(
            require_query(Some("sunset beach".to_string())).unwrap(),
            "sunset beach"
        );
    }
}
