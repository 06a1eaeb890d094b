//! Comment service.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use vidtube_common::{AppResult, IdGenerator};
use vidtube_db::{
    entities::{comment, user},
    repositories::{CommentRepository, VideoRepository},
};

use crate::services::video::CommentWithAuthor;

/// Input for commenting on a video.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentInput {
    #[validate(length(min = 1, max = 5000, message = "Please enter a comment"))]
    pub text: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    video_repo: VideoRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, video_repo: VideoRepository) -> Self {
        Self {
            comment_repo,
            video_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a comment as `author` on a video.
    pub async fn add_comment(
        &self,
        author: &user::Model,
        video_id: &str,
        input: AddCommentInput,
    ) -> AppResult<CommentWithAuthor> {
        self.video_repo.get_by_id(video_id).await?;
        input.validate()?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(input.text),
            user_id: Set(author.id.clone()),
            video_id: Set(video_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %comment.id, video_id = %video_id, "Comment added");

        Ok(CommentWithAuthor {
            comment,
            author: author.clone(),
        })
    }
}
