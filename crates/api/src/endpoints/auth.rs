//! Authentication endpoints.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use vidtube_common::AppResult;
use vidtube_core::{LoginInput, SignupInput};
use vidtube_db::entities::user;

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::ApiResponse,
};

/// Bearer token issued at signup and login.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
}

/// Account fields visible to their owner.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub channel_description: Option<String>,
    pub avatar: Option<String>,
    pub cover: Option<String>,
    pub email: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname,
            lastname: user.lastname,
            username: user.username,
            channel_description: user.channel_description,
            avatar: user.avatar,
            cover: user.cover,
            email: user.email,
        }
    }
}

/// Create a new account.
async fn signup(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<SignupInput>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let user = state.user_service.signup(input).await?;

    Ok(ApiResponse::ok(TokenResponse {
        token: user.token.unwrap_or_default(),
    }))
}

/// Sign in with email and password.
async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let user = state.user_service.login(input).await?;

    Ok(ApiResponse::ok(TokenResponse {
        token: user.token.unwrap_or_default(),
    }))
}

/// The signed-in account.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
}
