//! User and channel endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use vidtube_common::AppResult;
use vidtube_core::{ChannelSummary, EditProfileInput, Profile, ProfileVideo, SubscribedChannel};

use super::{
    auth::UserResponse,
    videos::{VideoSummaryResponse, summaries},
};
use crate::{
    extractors::{AuthUser, JsonBody, Pagination, QueryParams, SearchQuery},
    middleware::AppState,
    response::{ApiResponse, Empty, empty},
};

/// A channel in search results and suggestions.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
    pub channel_description: Option<String>,
    pub subscribers_count: u64,
    pub videos_count: u64,
    pub is_subscribed: bool,
    pub is_me: bool,
}

impl From<ChannelSummary> for ChannelResponse {
    fn from(c: ChannelSummary) -> Self {
        Self {
            id: c.user.id,
            username: c.user.username,
            avatar: c.user.avatar,
            channel_description: c.user.channel_description,
            subscribers_count: c.subscribers_count,
            videos_count: c.videos_count,
            is_subscribed: c.is_subscribed,
            is_me: c.is_me,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannelResponse {
    pub id: String,
    pub avatar: Option<String>,
    pub username: String,
    pub subscribers_count: u64,
}

impl From<SubscribedChannel> for SubscribedChannelResponse {
    fn from(c: SubscribedChannel) -> Self {
        Self {
            id: c.user.id,
            avatar: c.user.avatar,
            username: c.user.username,
            subscribers_count: c.subscribers_count,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileVideoResponse {
    pub id: String,
    pub thumbnail: String,
    pub title: String,
    pub created_at: DateTime<FixedOffset>,
    pub views: u64,
}

impl From<ProfileVideo> for ProfileVideoResponse {
    fn from(v: ProfileVideo) -> Self {
        Self {
            id: v.video.id,
            thumbnail: v.video.thumbnail,
            title: v.video.title,
            created_at: v.video.created_at,
            views: v.views,
        }
    }
}

/// A channel page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub cover: Option<String>,
    pub avatar: Option<String>,
    pub email: String,
    pub channel_description: Option<String>,
    pub subscribers_count: u64,
    pub is_me: bool,
    pub is_subscribed: bool,
    pub channels: Vec<SubscribedChannelResponse>,
    pub videos: Vec<ProfileVideoResponse>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.user.id,
            firstname: p.user.firstname,
            lastname: p.user.lastname,
            username: p.user.username,
            cover: p.user.cover,
            avatar: p.user.avatar,
            email: p.user.email,
            channel_description: p.user.channel_description,
            subscribers_count: p.subscribers_count,
            is_me: p.is_me,
            is_subscribed: p.is_subscribed,
            channels: p.channels.into_iter().map(Into::into).collect(),
            videos: p.videos.into_iter().map(Into::into).collect(),
        }
    }
}

fn channels(list: Vec<ChannelSummary>) -> Vec<ChannelResponse> {
    list.into_iter().map(Into::into).collect()
}

/// Suggested channels.
async fn recommend_channels(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ChannelResponse>>> {
    let list = state.channel_service.recommended(&user.id).await?;
    Ok(ApiResponse::ok(channels(list)))
}

/// Update the signed-in user's profile.
async fn edit_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<EditProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.edit_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Videos from subscribed channels.
async fn feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Pagination>,
) -> AppResult<ApiResponse<Vec<VideoSummaryResponse>>> {
    let videos = state
        .video_service
        .feed(&user.id, page.limit(), page.offset)
        .await?;
    Ok(ApiResponse::ok(summaries(videos)))
}

async fn liked_videos(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<VideoSummaryResponse>>> {
    let videos = state.video_service.liked(&user.id).await?;
    Ok(ApiResponse::ok(summaries(videos)))
}

async fn history(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<VideoSummaryResponse>>> {
    let videos = state.video_service.history(&user.id).await?;
    Ok(ApiResponse::ok(summaries(videos)))
}

/// Search channels by username.
async fn search_users(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> AppResult<ApiResponse<Vec<ChannelResponse>>> {
    let list = state
        .channel_service
        .search(&user.id, query.searchterm.as_deref())
        .await?;
    Ok(ApiResponse::ok(channels(list)))
}

/// A user's channel page.
async fn get_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.channel_service.profile(&user.id, &id).await?;
    Ok(ApiResponse::ok(profile.into()))
}

/// Subscribe or unsubscribe.
async fn toggle_subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    state.subscription_service.toggle(&user.id, &id).await?;
    Ok(empty())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(recommend_channels).put(edit_profile))
        .route("/feed", get(feed))
        .route("/liked-videos", get(liked_videos))
        .route("/history", get(history))
        .route("/search", get(search_users))
        .route("/{id}", get(get_profile))
        .route("/{id}/togglesubscribe", get(toggle_subscribe))
}
