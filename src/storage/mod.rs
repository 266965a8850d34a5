// Object Storage Module
pub mod signer;

pub use signer::UrlSigner;
