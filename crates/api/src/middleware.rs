//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use vidtube_core::{
    ChannelService, CommentService, SubscriptionService, UserService, VideoLikeService,
    VideoService, ViewService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub subscription_service: SubscriptionService,
    pub channel_service: ChannelService,
    pub video_service: VideoService,
    pub video_like_service: VideoLikeService,
    pub comment_service: CommentService,
    pub view_service: ViewService,
}

/// Resolve `Authorization: Bearer <token>` to a user stored in request extensions.
///
/// Requests without a valid token pass through untouched; protected handlers
/// reject them through the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = token {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Bearer token rejected"),
        }
    }

    next.run(req).await
}
