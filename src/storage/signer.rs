//! Presigned URL generation for object storage
//!
//! Signs GET requests with SigV4 query parameters so callers can fetch
//! indexed objects for a limited time without holding storage credentials.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::errors::{ApiError, ApiResult};

type HmacSha256 = Hmac<Sha256>;

/// Characters that survive SigV4 URI encoding.
const SIGV4_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same set, but object key paths keep their segment separators.
const SIGV4_PATH_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

pub struct UrlSigner {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    region: String,
    expiry_secs: u64,
}

impl UrlSigner {
    pub fn new(
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
        region: String,
        expiry_secs: u64,
    ) -> Self {
        Self {
            access_key_id,
            secret_access_key,
            session_token,
            region,
            expiry_secs,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let access_key_id = config
            .access_key_id
            .clone()
            .ok_or_else(|| anyhow::anyhow!("AWS_ACCESS_KEY_ID is not set"))?;
        let secret_access_key = config
            .secret_access_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("AWS_SECRET_ACCESS_KEY is not set"))?;

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: config.session_token.clone(),
            region: config.region.clone(),
            expiry_secs: config.presign_expiry_secs,
        })
    }

    /// Exchange an `s3://bucket/key` URL for a time-limited HTTPS URL.
    pub fn presign(&self, object_url: &str) -> ApiResult<String> {
        self.presign_at(object_url, Utc::now())
    }

    /// Presign against an explicit timestamp. Deterministic for a fixed
    /// timestamp, which is what the tests rely on.
    pub fn presign_at(&self, object_url: &str, now: DateTime<Utc>) -> ApiResult<String> {
        let (bucket, key) = parse_object_url(object_url)?;

        let host = format!("{}.s3.{}.amazonaws.com", bucket, self.region);
        let canonical_uri = format!("/{}", utf8_percent_encode(key, SIGV4_PATH_ENCODE));

        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let datestamp = now.format("%Y%m%d").to_string();
        let scope = format!("{}/{}/s3/aws4_request", datestamp, self.region);
        let credential = format!("{}/{}", self.access_key_id, scope);

        // Query parameters, already in canonical (sorted) order.
        let mut params: Vec<(&str, String)> = vec![
            ("X-Amz-Algorithm", "AWS4-HMAC-SHA256".to_string()),
            ("X-Amz-Credential", credential),
            ("X-Amz-Date", amz_date.clone()),
            ("X-Amz-Expires", self.expiry_secs.to_string()),
        ];
        if let Some(token) = &self.session_token {
            params.push(("X-Amz-Security-Token", token.clone()));
        }
        params.push(("X-Amz-SignedHeaders", "host".to_string()));

        let canonical_query = params
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, SIGV4_ENCODE),
                    utf8_percent_encode(v, SIGV4_ENCODE)
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        let canonical_request = format!(
            "GET\n{}\n{}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
            canonical_uri, canonical_query, host
        );

        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            hex(Sha256::digest(canonical_request.as_bytes()).as_slice())
        );

        let date_key = hmac_sha256(
            format!("AWS4{}", self.secret_access_key).as_bytes(),
            datestamp.as_bytes(),
        )?;
        let region_key = hmac_sha256(&date_key, self.region.as_bytes())?;
        let service_key = hmac_sha256(&region_key, b"s3")?;
        let signing_key = hmac_sha256(&service_key, b"aws4_request")?;
        let signature = hex(&hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        Ok(format!(
            "https://{}{}?{}&X-Amz-Signature={}",
            host, canonical_uri, canonical_query, signature
        ))
    }
}

/// Split an `s3://bucket/key` URL into bucket and key.
fn parse_object_url(object_url: &str) -> ApiResult<(&str, &str)> {
    let rest = object_url
        .strip_prefix("s3://")
        .ok_or_else(|| ApiError::Signing(format!("not an s3:// URL: {}", object_url)))?;

    let (bucket, key) = rest
        .split_once('/')
        .ok_or_else(|| ApiError::Signing(format!("missing object key: {}", object_url)))?;

    if bucket.is_empty() || key.is_empty() {
        return Err(ApiError::Signing(format!(
            "empty bucket or key: {}",
            object_url
        )));
    }

    Ok((bucket, key))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> ApiResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ApiError::Signing(format!("invalid HMAC key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn signer() -> UrlSigner {
        UrlSigner::new(
            "AKIDEXAMPLE".to_string(),
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            None,
            "eu-west-1".to_string(),
            3600,
        )
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 21, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_bucket_and_key() {
        let (bucket, key) = parse_object_url("s3://bucket/photos/sunset.jpg").unwrap();
        assert_eq!(bucket, "bucket");
        assert_eq!(key, "photos/sunset.jpg");
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(parse_object_url("https://bucket/key").is_err());
        assert!(parse_object_url("s3://bucket-only").is_err());
        assert!(parse_object_url("s3:///key").is_err());
    }

    #[test]
    fn presigned_url_carries_expiry_and_scope() {
        let url = signer()
            .presign_at("s3://bucket/photos/sunset.jpg", fixed_now())
            .unwrap();

        assert!(url.starts_with("https://bucket.s3.eu-west-1.amazonaws.com/photos/sunset.jpg?"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Date=20240521T120000Z"));
        assert!(url.contains("20240521%2Feu-west-1%2Fs3%2Faws4_request"));
        assert!(url.contains("X-Amz-SignedHeaders=host"));
    }

    #[test]
    fn presign_is_deterministic_for_a_fixed_timestamp() {
        let a = signer()
            .presign_at("s3://bucket/a.txt", fixed_now())
            .unwrap();
        let b = signer()
            .presign_at("s3://bucket/a.txt", fixed_now())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn signature_is_hex_encoded_sha256_length() {
        let url = signer()
            .presign_at("s3://bucket/a.txt", fixed_now())
            .unwrap();
        let signature = url.split("X-Amz-Signature=").nth(1).unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn object_keys_with_spaces_are_encoded() {
        let url = signer()
            .presign_at("s3://bucket/my photo.jpg", fixed_now())
            .unwrap();
        assert!(url.contains("/my%20photo.jpg?"));
    }

    #[test]
    fn session_token_is_included_when_present() {
        let mut signer = signer();
        signer.session_token = Some("FwoGZXIvYXdzEBc".to_string());
        let url = signer
            .presign_at("s3://bucket/a.txt", fixed_now())
            .unwrap();
        assert!(url.contains("X-Amz-Security-Token=FwoGZXIvYXdzEBc"));
    }
}
