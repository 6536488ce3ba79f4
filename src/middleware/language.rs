//! Per-request interface language.
//!
//! Resolution order: `?lang=` query, `Accept-Language` header, the language
//! stored on the caller's profile (carried in the token), then French.

use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use mesrs_core::Language;
use mesrs_models::dashboard::LanguageQuery;

use crate::middleware::auth::OptionalAuthUser;
use crate::state::AppState;

pub fn query_language(parts: &Parts) -> Option<Language> {
    Query::<LanguageQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.lang)
}

/// Language chosen by the request itself, ignoring the profile.
pub fn header_language(parts: &Parts) -> Option<Language> {
    query_language(parts).or_else(|| {
        parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(Language::from_accept_language)
    })
}

/// Language asked for by the request (query or header), if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedLanguage(pub Option<Language>);

impl<S> FromRequestParts<S> for RequestedLanguage
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestedLanguage(header_language(parts)))
    }
}

/// Fully resolved language, falling back to the caller's profile and then French.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLanguage(pub Language);

impl FromRequestParts<AppState> for RequestLanguage {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(language) = header_language(parts) {
            return Ok(RequestLanguage(language));
        }

        let OptionalAuthUser(auth_user) = OptionalAuthUser::from_request_parts(parts, state).await?;
        Ok(RequestLanguage(Language::resolve(
            None,
            None,
            auth_user.map(|user| user.language()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, accept: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT_LANGUAGE, accept);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn query_wins_over_header() {
        let p = parts("/api/dashboard/stat-cards?lang=ar", Some("fr-FR,fr;q=0.9"));
        assert_eq!(header_language(&p), Some(Language::Ar));
    }

    #[test]
    fn header_used_without_query() {
        let p = parts("/api/dashboard/stat-cards", Some("ar-MR,ar;q=0.9,fr;q=0.8"));
        assert_eq!(header_language(&p), Some(Language::Ar));
    }

    #[test]
    fn unsupported_query_falls_back_to_header() {
        let p = parts("/api/navigation/menu?lang=en", Some("fr"));
        assert_eq!(header_language(&p), Some(Language::Fr));
    }

    #[test]
    fn nothing_resolves_to_none() {
        let p = parts("/api/navigation/menu", None);
        assert_eq!(header_language(&p), None);
    }
}
