//! Video endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use vidtube_common::AppResult;
use vidtube_core::{AddCommentInput, CommentWithAuthor, CreateVideoInput, VideoDetail, VideoSummary};
use vidtube_db::entities::{user, video};

use crate::{
    extractors::{AuthUser, JsonBody, Pagination, QueryParams, SearchQuery},
    middleware::AppState,
    response::{ApiResponse, Empty, empty},
};

/// Public fields of a video's or comment's author.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<user::Model> for AuthorResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
        }
    }
}

/// A newly published video.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub thumbnail: String,
    pub user_id: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<video::Model> for VideoResponse {
    fn from(video: video::Model) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            url: video.url,
            thumbnail: video.thumbnail,
            user_id: video.user_id,
            created_at: video.created_at,
        }
    }
}

/// A video in a listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummaryResponse {
    #[serde(flatten)]
    pub video: VideoResponse,
    pub user: AuthorResponse,
    pub views: u64,
}

impl From<VideoSummary> for VideoSummaryResponse {
    fn from(summary: VideoSummary) -> Self {
        Self {
            video: summary.video.into(),
            user: summary.author.into(),
            views: summary.views,
        }
    }
}

/// Map service summaries to listing items.
pub fn summaries(videos: Vec<VideoSummary>) -> Vec<VideoSummaryResponse> {
    videos.into_iter().map(Into::into).collect()
}

/// A comment with its author.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub text: String,
    pub user_id: String,
    pub video_id: String,
    pub created_at: DateTime<FixedOffset>,
    pub user: AuthorResponse,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(c: CommentWithAuthor) -> Self {
        Self {
            id: c.comment.id,
            text: c.comment.text,
            user_id: c.comment.user_id,
            video_id: c.comment.video_id,
            created_at: c.comment.created_at,
            user: c.author.into(),
        }
    }
}

/// The single-video page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetailResponse {
    #[serde(flatten)]
    pub video: VideoResponse,
    pub user: AuthorResponse,
    pub comments: Vec<CommentResponse>,
    pub comments_count: u64,
    pub is_liked: bool,
    pub is_disliked: bool,
    pub likes_count: u64,
    pub dislikes_count: u64,
    pub views: u64,
    pub is_video_mine: bool,
    pub is_subscribed: bool,
    pub is_viewed: bool,
    pub subscribers_count: u64,
}

impl From<VideoDetail> for VideoDetailResponse {
    fn from(d: VideoDetail) -> Self {
        Self {
            video: d.video.into(),
            user: d.author.into(),
            comments: d.comments.into_iter().map(Into::into).collect(),
            comments_count: d.comments_count,
            is_liked: d.is_liked,
            is_disliked: d.is_disliked,
            likes_count: d.likes_count,
            dislikes_count: d.dislikes_count,
            views: d.views,
            is_video_mine: d.is_video_mine,
            is_subscribed: d.is_subscribed,
            is_viewed: d.is_viewed,
            subscribers_count: d.subscribers_count,
        }
    }
}

/// Publish a video.
async fn create_video(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateVideoInput>,
) -> AppResult<ApiResponse<VideoResponse>> {
    let video = state.video_service.create(&user.id, input).await?;
    Ok(ApiResponse::ok(video.into()))
}

/// All videos, newest first.
async fn recommended_videos(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    QueryParams(page): QueryParams<Pagination>,
) -> AppResult<ApiResponse<Vec<VideoSummaryResponse>>> {
    let videos = state
        .video_service
        .recommended(page.limit(), page.offset)
        .await?;
    Ok(ApiResponse::ok(summaries(videos)))
}

/// Search videos by title or description.
async fn search_videos(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
    QueryParams(page): QueryParams<Pagination>,
) -> AppResult<ApiResponse<Vec<VideoSummaryResponse>>> {
    let videos = state
        .video_service
        .search(query.searchterm.as_deref(), page.limit(), page.offset)
        .await?;
    Ok(ApiResponse::ok(summaries(videos)))
}

/// Get a video with comments, counts and viewer flags.
async fn get_video(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<VideoDetailResponse>> {
    let detail = state.video_service.get_detail(&user.id, &id).await?;
    Ok(ApiResponse::ok(detail.into()))
}

/// Toggle a like.
async fn like_video(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    state.video_like_service.toggle_like(&user.id, &id).await?;
    Ok(empty())
}

/// Toggle a dislike.
async fn dislike_video(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    state.video_like_service.toggle_dislike(&user.id, &id).await?;
    Ok(empty())
}

/// Comment on a video.
async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<AddCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.add_comment(&user, &id, input).await?;
    Ok(ApiResponse::ok(comment.into()))
}

/// Record a view.
async fn record_view(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    state.view_service.record_view(&user.id, &id).await?;
    Ok(empty())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(recommended_videos).post(create_video))
        .route("/search", get(search_videos))
        .route("/{id}", get(get_video))
        .route("/{id}/like", get(like_video))
        .route("/{id}/dislike", get(dislike_video))
        .route("/{id}/comment", post(add_comment))
        .route("/{id}/view", get(record_view))
}
