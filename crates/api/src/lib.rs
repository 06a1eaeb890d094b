//! HTTP API layer for vidtube.
//!
//! - **Endpoints**: `/auth`, `/users` and `/videos` routers
//! - **Extractors**: authenticated viewer, JSON bodies and query strings that
//!   reject with the standard error envelope
//! - **Middleware**: bearer token resolution
//!
//! Built on Axum 0.8. The binary mounts [`router`] under `/api/v1`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
