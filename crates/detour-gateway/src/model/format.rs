use axum::extract::{FromRequestParts, Query};
use axum::http::header::ACCEPT;
use axum::http::request::Parts;
use serde::Deserialize;
use std::convert::Infallible;

#[derive(Deserialize)]
struct FormatQuery {
    format: Option<String>,
}

/// How a mutation should answer.
///
/// Clients asking for JSON, through the `Accept` header or `?format=json`,
/// get the outcome as JSON. Everyone else is redirected back to the list
/// and sees the outcome as flash messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Page,
}

impl ResponseFormat {
    pub fn from_parts(parts: &Parts) -> Self {
        let by_query = Query::<FormatQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.format)
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));
        let by_header = parts
            .headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"));

        if by_query || by_header {
            ResponseFormat::Json
        } else {
            ResponseFormat::Page
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ResponseFormat {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
