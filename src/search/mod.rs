// Search Module
pub mod client;
pub mod enrich;
pub mod opensearch;

pub use client::{DocumentHit, DocumentSource, ImageHit, SearchClient};
pub use enrich::{enrich_document, enrich_image, EnrichedDocument, EnrichedImage};
pub use opensearch::OpenSearchClient;
