//! HTTP surface of the search front end
//!
//! Route handlers for text search, image search, bulk index deletion, and
//! text embedding.

pub mod routes;

pub use routes::{configure, AppState};
