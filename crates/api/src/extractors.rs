//! Request extractors.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use serde::Deserialize;
use vidtube_common::AppError;
use vidtube_db::entities::user;

/// Default page size for video listings.
pub const DEFAULT_LIMIT: u64 = 50;

/// Largest page size a client may request.
pub const MAX_LIMIT: u64 = 100;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// JSON body whose rejection uses the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string whose rejection uses the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// `?limit=&offset=` pagination.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Pagination {
    /// Requested page size, capped at [`MAX_LIMIT`].
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.min(MAX_LIMIT)
    }
}

/// `?searchterm=` query.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub searchterm: Option<String>,
}
