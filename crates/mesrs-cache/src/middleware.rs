//! HTTP caching headers: `Cache-Control` and `ETag`.

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheControlConfig {
    pub public: bool,
    pub max_age: u64,
    pub no_store: bool,
}

impl CacheControlConfig {
    pub fn public(max_age: u64) -> Self {
        Self {
            public: true,
            max_age,
            no_store: false,
        }
    }

    /// Browser-only caching. Dashboard series use this with their refresh
    /// interval as `max_age`.
    pub fn private(max_age: u64) -> Self {
        Self {
            public: false,
            max_age,
            no_store: false,
        }
    }

    pub fn no_store() -> Self {
        Self {
            public: false,
            max_age: 0,
            no_store: true,
        }
    }

    pub fn to_header_value(&self) -> HeaderValue {
        let value = if self.no_store {
            "no-store".to_string()
        } else {
            let scope = if self.public { "public" } else { "private" };
            format!("{}, max-age={}", scope, self.max_age)
        };

        HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("no-store"))
    }
}

fn generate_etag(body: &[u8]) -> String {
    let hash = Sha256::digest(body);
    format!("\"{}\"", hex::encode(&hash[..16]))
}

fn etags_match(client_etag: &str, server_etag: &str) -> bool {
    let client = client_etag.trim().trim_start_matches("W/");
    let server = server_etag.trim().trim_start_matches("W/");
    client == server
}

/// Adds an `ETag` to successful responses and answers `304 Not Modified`
/// when `If-None-Match` matches. Buffers the body, so it is only mounted on
/// the dashboard routes whose payloads are small.
pub async fn etag_middleware(request: Request, next: Next) -> Response {
    let if_none_match = request
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let response = next.run(request).await;

    if !response.status().is_success() || response.headers().contains_key(ETAG) {
        return response;
    }

    let (parts, body) = response.into_parts();

    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return (parts, Body::empty()).into_response(),
    };

    let etag = generate_etag(&bytes);

    if let Some(client_etag) = if_none_match {
        if client_etag.split(',').any(|tag| etags_match(tag, &etag)) {
            let mut not_modified = StatusCode::NOT_MODIFIED.into_response();
            if let Some(cc) = parts.headers.get(CACHE_CONTROL) {
                not_modified.headers_mut().insert(CACHE_CONTROL, cc.clone());
            }
            return not_modified;
        }
    }

    let mut response = Response::from_parts(parts, Body::from(bytes));
    if let Ok(etag_value) = HeaderValue::from_str(&etag) {
        response.headers_mut().insert(ETAG, etag_value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_header_carries_refresh_interval() {
        let header = CacheControlConfig::private(30).to_header_value();
        assert_eq!(header.to_str().unwrap(), "private, max-age=30");
    }

    #[test]
    fn public_and_no_store_headers() {
        assert_eq!(
            CacheControlConfig::public(300).to_header_value().to_str().unwrap(),
            "public, max-age=300"
        );
        assert_eq!(
            CacheControlConfig::no_store().to_header_value().to_str().unwrap(),
            "no-store"
        );
    }

    #[test]
    fn etag_is_quoted_and_deterministic() {
        let a = generate_etag(b"{\"total\":1}");
        assert!(a.starts_with('"') && a.ends_with('"'));
        assert_eq!(a, generate_etag(b"{\"total\":1}"));
        assert_ne!(a, generate_etag(b"{\"total\":2}"));
    }

    #[test]
    fn weak_etags_match_strong_ones() {
        assert!(etags_match("W/\"abc\"", "\"abc\""));
        assert!(etags_match(" \"abc\"", "\"abc\""));
        assert!(!etags_match("\"abc\"", "\"xyz\""));
    }
}
