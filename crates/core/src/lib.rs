//! Core business logic for vidtube.
//!
//! Services sit between the HTTP layer and the repositories. List endpoints
//! fetch their primary rows first, then attach counts and viewer flags from
//! batch queries over the whole page.

pub mod services;

pub use services::*;
