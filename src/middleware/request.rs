use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

/// Caller details recorded with each activity log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
        })
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = forwarded_ip(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = parts
            .headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(RequestMeta {
            ip_address,
            user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_forwarded_address_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "41.188.10.2, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.9".parse().unwrap());
        assert_eq!(forwarded_ip(&headers), Some("41.188.10.2".to_string()));
    }

    #[test]
    fn real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.9".parse().unwrap());
        assert_eq!(forwarded_ip(&headers), Some("10.0.0.9".to_string()));
        assert_eq!(forwarded_ip(&HeaderMap::new()), None);
    }
}
