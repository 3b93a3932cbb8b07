// Bearer extractor - hands the caller's Authorization header to handlers
// untouched, so it can be forwarded to the backend verbatim

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;

/// Raw `Authorization` header of the incoming request, if any.
///
/// Token validation is the backend's job; the proxy only relays it.
///
/// ```rust,ignore
/// async fn handler(auth: BearerToken) -> AppResult<Json<Value>> {
///     let request = ForwardRequest::get("topics").authorization(auth.into_header());
///     ...
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerToken(Option<String>);

impl BearerToken {
    pub fn new(header: Option<String>) -> Self {
        Self(header)
    }

    pub fn header(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn into_header(self) -> Option<String> {
        self.0
    }

    /// Token part of a `Bearer <token>` header.
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref().and_then(|h| h.strip_prefix("Bearer "))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = match parts.headers.get(header::AUTHORIZATION) {
            None => Ok(BearerToken(None)),
            Some(value) => value
                .to_str()
                .map(|v| BearerToken(Some(v.to_string())))
                .map_err(|_| AppError::BadRequest("Invalid authorization header".to_string())),
        };

        async move { token }
    }
}
