//! Video service: uploads, the single-video page, and every video listing.
//!
//! Listings follow one shape: a primary query picks and orders the videos, then
//! authors and view counts are fetched for the whole page in two batch queries
//! and merged back in the original order.

use futures::try_join;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use vidtube_common::{AppError, AppResult, IdGenerator};
use vidtube_db::{
    entities::{comment, user, video, video_like},
    repositories::{
        CommentRepository, SubscriptionRepository, UserRepository, VideoLikeRepository,
        VideoRepository, ViewRepository,
    },
};

use crate::services::aggregate::{CountLookup, distinct_keys, index_by_id};

/// A video with its author and view count.
#[derive(Debug, Clone)]
pub struct VideoSummary {
    pub video: video::Model,
    pub author: user::Model,
    pub views: u64,
}

/// A comment with its author.
#[derive(Debug, Clone)]
pub struct CommentWithAuthor {
    pub comment: comment::Model,
    pub author: user::Model,
}

/// Everything shown on the single-video page, from the viewer's perspective.
#[derive(Debug, Clone)]
pub struct VideoDetail {
    pub video: video::Model,
    pub author: user::Model,
    pub comments: Vec<CommentWithAuthor>,
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

/// Input for publishing a video.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVideoInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(url)]
    pub url: String,

    #[validate(url)]
    pub thumbnail: String,
}

/// Relation tables that record which videos a user touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoRelation {
    /// Videos the user liked.
    Liked,
    /// Videos the user viewed.
    Viewed,
}

/// Video service for business logic.
#[derive(Clone)]
pub struct VideoService {
    video_repo: VideoRepository,
    user_repo: UserRepository,
    view_repo: ViewRepository,
    video_like_repo: VideoLikeRepository,
    comment_repo: CommentRepository,
    subscription_repo: SubscriptionRepository,
    id_gen: IdGenerator,
}

impl VideoService {
    /// Create a new video service.
    #[must_use]
    pub const fn new(
        video_repo: VideoRepository,
        user_repo: UserRepository,
        view_repo: ViewRepository,
        video_like_repo: VideoLikeRepository,
        comment_repo: CommentRepository,
        subscription_repo: SubscriptionRepository,
    ) -> Self {
        Self {
            video_repo,
            user_repo,
            view_repo,
            video_like_repo,
            comment_repo,
            subscription_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a video owned by `owner_id`.
    pub async fn create(&self, owner_id: &str, input: CreateVideoInput) -> AppResult<video::Model> {
        input.validate()?;

        let model = video::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            description: Set(input.description),
            url: Set(input.url),
            thumbnail: Set(input.thumbnail),
            user_id: Set(owner_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let video = self.video_repo.create(model).await?;
        tracing::info!(video_id = %video.id, owner = %owner_id, "Video created");

        Ok(video)
    }

    /// Load the single-video page for `viewer_id`.
    pub async fn get_detail(&self, viewer_id: &str, video_id: &str) -> AppResult<VideoDetail> {
        let video = self.video_repo.get_by_id(video_id).await?;
        let owner_id = video.user_id.as_str();

        let (
            author,
            comments,
            comments_count,
            own_like,
            likes_count,
            dislikes_count,
            views,
            is_subscribed,
            is_viewed,
            subscribers_count,
        ) = try_join!(
            self.user_repo.get_by_id(owner_id),
            self.comment_repo.find_by_video(video_id),
            self.comment_repo.count_by_video(video_id),
            self.video_like_repo.find_by_user_and_video(viewer_id, video_id),
            self.video_like_repo.count_by_video(video_id, video_like::LIKE),
            self.video_like_repo.count_by_video(video_id, video_like::DISLIKE),
            self.view_repo.count_by_video(video_id),
            self.subscription_repo.is_subscribed(viewer_id, owner_id),
            self.view_repo.has_viewed(viewer_id, video_id),
            self.subscription_repo.count_subscribers(owner_id),
        )?;

        let comments = self.attach_comment_authors(comments).await?;
        let own_sign = own_like.map(|l| l.like);
        let is_video_mine = viewer_id == owner_id;

        Ok(VideoDetail {
            author,
            comments,
            comments_count,
            is_liked: own_sign == Some(video_like::LIKE),
            is_disliked: own_sign == Some(video_like::DISLIKE),
            likes_count,
            dislikes_count,
            views,
            is_video_mine,
            is_subscribed,
            is_viewed,
            subscribers_count,
            video,
        })
    }

    /// All videos, newest first.
    pub async fn recommended(&self, limit: u64, offset: u64) -> AppResult<Vec<VideoSummary>> {
        let videos = self.video_repo.find_recent(limit, offset).await?;
        self.summarize(videos).await
    }

    /// Videos whose title or description contains `term`.
    pub async fn search(
        &self,
        term: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<VideoSummary>> {
        let term = term.map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Err(AppError::BadRequest(
                "Please enter the searchterm".to_string(),
            ));
        }

        let videos = self.video_repo.search(term, limit, offset).await?;
        self.summarize(videos).await
    }

    /// Videos from the channels `viewer_id` subscribes to, newest first.
    pub async fn feed(
        &self,
        viewer_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<VideoSummary>> {
        let channel_ids = self.subscription_repo.find_channel_ids(viewer_id).await?;
        let videos = self
            .video_repo
            .find_by_users(&channel_ids, limit, offset)
            .await?;
        self.summarize(videos).await
    }

    /// Videos related to `viewer_id` through `relation`, in relation order.
    pub async fn related(
        &self,
        viewer_id: &str,
        relation: VideoRelation,
    ) -> AppResult<Vec<VideoSummary>> {
        let ids = match relation {
            VideoRelation::Liked => self.video_like_repo.find_liked_video_ids(viewer_id).await?,
            VideoRelation::Viewed => self.view_repo.find_viewed_video_ids(viewer_id).await?,
        };

        let mut by_id = index_by_id(self.video_repo.find_by_ids(&ids).await?, |v| &v.id);
        let videos = ids.iter().filter_map(|id| by_id.remove(id)).collect();

        self.summarize(videos).await
    }

    /// Videos the viewer liked.
    pub async fn liked(&self, viewer_id: &str) -> AppResult<Vec<VideoSummary>> {
        self.related(viewer_id, VideoRelation::Liked).await
    }

    /// Videos the viewer watched.
    pub async fn history(&self, viewer_id: &str) -> AppResult<Vec<VideoSummary>> {
        self.related(viewer_id, VideoRelation::Viewed).await
    }

    /// Attach authors and view counts, keeping the input order.
    async fn summarize(&self, videos: Vec<video::Model>) -> AppResult<Vec<VideoSummary>> {
        if videos.is_empty() {
            return Ok(vec![]);
        }

        let author_ids = distinct_keys(&videos, |v| &v.user_id);
        let video_ids: Vec<String> = videos.iter().map(|v| v.id.clone()).collect();

        let (authors, views) = try_join!(
            self.user_repo.find_by_ids(&author_ids),
            self.view_repo.count_by_videos(&video_ids),
        )?;
        let authors = index_by_id(authors, |u| &u.id);

        Ok(videos
            .into_iter()
            .filter_map(|video| {
                let Some(author) = authors.get(&video.user_id).cloned() else {
                    tracing::warn!(video_id = %video.id, user_id = %video.user_id, "Video author missing");
                    return None;
                };
                Some(VideoSummary {
                    views: views.count_of(&video.id),
                    author,
                    video,
                })
            })
            .collect())
    }

    async fn attach_comment_authors(
        &self,
        comments: Vec<comment::Model>,
    ) -> AppResult<Vec<CommentWithAuthor>> {
        if comments.is_empty() {
            return Ok(vec![]);
        }

        let author_ids = distinct_keys(&comments, |c| &c.user_id);
        let authors = index_by_id(self.user_repo.find_by_ids(&author_ids).await?, |u| &u.id);

        Ok(comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.user_id).cloned()?;
                Some(CommentWithAuthor { comment, author })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            firstname: "Test".to_string(),
            lastname: "User".to_string(),
            username: id.to_string(),
            email: format!("{id}@example.com"),
            password: "hash".to_string(),
            token: None,
            channel_description: None,
            avatar: None,
            cover: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_video(id: &str, user_id: &str) -> video::Model {
        video::Model {
            id: id.to_string(),
            title: format!("video {id}"),
            description: None,
            url: format!("https://cdn.example.com/{id}.mp4"),
            thumbnail: format!("https://cdn.example.com/{id}.jpg"),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn group_row(key: &str, total: i64) -> BTreeMap<&'static str, Value> {
        btreemap! {
            "group_key" => Value::from(key.to_string()),
            "total" => Value::BigInt(Some(total)),
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        btreemap! { "num_items" => Value::BigInt(Some(n)) }
    }

    fn pg() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    struct Mocks {
        video: MockDatabase,
        user: MockDatabase,
        view: MockDatabase,
        like: MockDatabase,
        comment: MockDatabase,
        subscription: MockDatabase,
    }

    impl Default for Mocks {
        fn default() -> Self {
            Self {
                video: pg(),
                user: pg(),
                view: pg(),
                like: pg(),
                comment: pg(),
                subscription: pg(),
            }
        }
    }

    impl Mocks {
        fn into_service(self) -> VideoService {
            VideoService::new(
                VideoRepository::new(Arc::new(self.video.into_connection())),
                UserRepository::new(Arc::new(self.user.into_connection())),
                ViewRepository::new(Arc::new(self.view.into_connection())),
                VideoLikeRepository::new(Arc::new(self.like.into_connection())),
                CommentRepository::new(Arc::new(self.comment.into_connection())),
                SubscriptionRepository::new(Arc::new(self.subscription.into_connection())),
            )
        }
    }

    #[tokio::test]
    async fn test_recommended_attaches_views_with_zero_default() {
        let mocks = Mocks {
            video: pg().append_query_results([[
                create_test_video("v3", "user1"),
                create_test_video("v2", "user2"),
                create_test_video("v1", "user1"),
            ]]),
            user: pg().append_query_results([[create_test_user("user1"), create_test_user("user2")]]),
            view: pg().append_query_results([vec![group_row("v3", 3), group_row("v1", 1)]]),
            ..Default::default()
        };

        let result = mocks.into_service().recommended(50, 0).await.unwrap();

        let ids: Vec<_> = result.iter().map(|s| s.video.id.as_str()).collect();
        assert_eq!(ids, vec!["v3", "v2", "v1"]);
        let views: Vec<_> = result.iter().map(|s| s.views).collect();
        assert_eq!(views, vec![3, 0, 1]);
        assert_eq!(result[1].author.id, "user2");
    }

    #[tokio::test]
    async fn test_recommended_empty_skips_aggregates() {
        // No results queued on the user or view mocks.
        let mocks = Mocks {
            video: pg().append_query_results([Vec::<video::Model>::new()]),
            ..Default::default()
        };

        let result = mocks.into_service().recommended(50, 0).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_search_requires_term() {
        let service = Mocks::default().into_service();

        for term in [None, Some(""), Some("   ")] {
            match service.search(term, 50, 0).await {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Please enter the searchterm"),
                _ => panic!("Expected BadRequest error"),
            }
        }
    }

    #[tokio::test]
    async fn test_feed_without_subscriptions_is_empty() {
        let mocks = Mocks {
            subscription: pg().append_query_results([Vec::<BTreeMap<&str, Value>>::new()]),
            ..Default::default()
        };

        let result = mocks.into_service().feed("user1", 50, 0).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_feed_returns_subscribed_channel_videos() {
        let mocks = Mocks {
            subscription: pg().append_query_results([vec![
                btreemap! { "subscribe_to" => Value::from("user2".to_string()) },
            ]]),
            video: pg().append_query_results([[create_test_video("v9", "user2")]]),
            user: pg().append_query_results([[create_test_user("user2")]]),
            view: pg().append_query_results([vec![group_row("v9", 2)]]),
            ..Default::default()
        };

        let result = mocks.into_service().feed("user1", 50, 0).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].video.id, "v9");
        assert_eq!(result[0].views, 2);
    }

    #[tokio::test]
    async fn test_history_keeps_relation_order() {
        let mocks = Mocks {
            view: pg()
                .append_query_results([vec![
                    btreemap! { "video_id" => Value::from("v2".to_string()) },
                    btreemap! { "video_id" => Value::from("v1".to_string()) },
                ]])
                .append_query_results([vec![group_row("v1", 5), group_row("v2", 1)]]),
            // Primary query returns rows in storage order, not relation order.
            video: pg().append_query_results([[
                create_test_video("v1", "user1"),
                create_test_video("v2", "user1"),
            ]]),
            user: pg().append_query_results([[create_test_user("user1")]]),
            ..Default::default()
        };

        let result = mocks.into_service().history("user1").await.unwrap();

        let ids: Vec<_> = result.iter().map(|s| s.video.id.as_str()).collect();
        assert_eq!(ids, vec!["v2", "v1"]);
        assert_eq!(result[0].views, 1);
        assert_eq!(result[1].views, 5);
    }

    #[tokio::test]
    async fn test_liked_keeps_relation_order() {
        let mocks = Mocks {
            like: pg().append_query_results([vec![
                btreemap! { "video_id" => Value::from("v2".to_string()) },
                btreemap! { "video_id" => Value::from("v1".to_string()) },
            ]]),
            video: pg().append_query_results([[
                create_test_video("v1", "user1"),
                create_test_video("v2", "user2"),
            ]]),
            user: pg().append_query_results([[create_test_user("user1"), create_test_user("user2")]]),
            view: pg().append_query_results([vec![group_row("v1", 3)]]),
            ..Default::default()
        };

        let result = mocks.into_service().liked("user1").await.unwrap();

        let ids: Vec<_> = result.iter().map(|s| s.video.id.as_str()).collect();
        assert_eq!(ids, vec!["v2", "v1"]);
        let views: Vec<_> = result.iter().map(|s| s.views).collect();
        assert_eq!(views, vec![0, 3]);
        assert_eq!(result[0].author.id, "user2");
    }

    #[tokio::test]
    async fn test_liked_without_likes_is_empty() {
        // Only the like mock has a result; any further query would fail.
        let mocks = Mocks {
            like: pg().append_query_results([Vec::<BTreeMap<&str, Value>>::new()]),
            ..Default::default()
        };

        let result = mocks.into_service().liked("user1").await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_recommended_is_repeatable() {
        let page = || {
            [
                create_test_video("v2", "user1"),
                create_test_video("v1", "user2"),
            ]
        };
        let authors = || [create_test_user("user1"), create_test_user("user2")];
        let views = || vec![group_row("v1", 7)];

        let mocks = Mocks {
            video: pg().append_query_results([page(), page()]),
            user: pg().append_query_results([authors(), authors()]),
            view: pg().append_query_results([views(), views()]),
            ..Default::default()
        };
        let service = mocks.into_service();

        let summarize = |list: Vec<VideoSummary>| {
            list.into_iter()
                .map(|s| (s.video.id, s.author.id, s.views))
                .collect::<Vec<_>>()
        };
        let first = summarize(service.recommended(50, 0).await.unwrap());
        let second = summarize(service.recommended(50, 0).await.unwrap());

        assert_eq!(first, second);
        assert_eq!(first[1], ("v1".to_string(), "user2".to_string(), 7));
    }

    #[tokio::test]
    async fn test_get_detail_unknown_video() {
        let mocks = Mocks {
            video: pg().append_query_results([Vec::<video::Model>::new()]),
            ..Default::default()
        };

        match mocks.into_service().get_detail("user1", "missing").await {
            Err(AppError::VideoNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected VideoNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_get_detail_assembles_flags_and_counts() {
        let comment = comment::Model {
            id: "c1".to_string(),
            text: "great".to_string(),
            user_id: "user3".to_string(),
            video_id: "v1".to_string(),
            created_at: Utc::now().into(),
        };
        let own_like = video_like::Model {
            id: "l1".to_string(),
            user_id: "user1".to_string(),
            video_id: "v1".to_string(),
            like: video_like::DISLIKE,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let mocks = Mocks {
            video: pg().append_query_results([[create_test_video("v1", "user2")]]),
            user: pg()
                .append_query_results([[create_test_user("user2")]])
                .append_query_results([[create_test_user("user3")]]),
            comment: pg()
                .append_query_results([[comment]])
                .append_query_results([[count_row(1)]]),
            like: pg()
                .append_query_results([[own_like]])
                .append_query_results([[count_row(4)]])
                .append_query_results([[count_row(1)]]),
            view: pg()
                .append_query_results([[count_row(10)]])
                .append_query_results([[count_row(1)]]),
            subscription: pg()
                .append_query_results([Vec::<vidtube_db::entities::subscription::Model>::new()])
                .append_query_results([[count_row(8)]]),
        };

        let detail = mocks.into_service().get_detail("user1", "v1").await.unwrap();

        assert_eq!(detail.author.id, "user2");
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].author.id, "user3");
        assert_eq!(detail.comments_count, 1);
        assert!(!detail.is_liked);
        assert!(detail.is_disliked);
        assert_eq!(detail.likes_count, 4);
        assert_eq!(detail.dislikes_count, 1);
        assert_eq!(detail.views, 10);
        assert!(!detail.is_video_mine);
        assert!(!detail.is_subscribed);
        assert!(detail.is_viewed);
        assert_eq!(detail.subscribers_count, 8);
    }

    #[test]
    fn test_create_video_input_validation() {
        let input = CreateVideoInput {
            title: String::new(),
            description: None,
            url: "https://cdn.example.com/v.mp4".to_string(),
            thumbnail: "https://cdn.example.com/v.jpg".to_string(),
        };
        assert!(input.validate().is_err());

        let input = CreateVideoInput {
            title: "Hello".to_string(),
            description: Some("first upload".to_string()),
            url: "https://cdn.example.com/v.mp4".to_string(),
            thumbnail: "https://cdn.example.com/v.jpg".to_string(),
        };
        assert!(input.validate().is_ok());
    }
}
