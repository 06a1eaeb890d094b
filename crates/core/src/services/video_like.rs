//! Like/dislike toggling.

use sea_orm::Set;
use vidtube_common::{AppResult, IdGenerator};
use vidtube_db::{
    entities::video_like,
    repositories::{VideoLikeRepository, VideoRepository},
};

/// A user's stance on one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    None,
    Liked,
    Disliked,
}

/// Which button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl LikeState {
    fn from_sign(sign: Option<i16>) -> Self {
        match sign {
            Some(video_like::LIKE) => Self::Liked,
            Some(video_like::DISLIKE) => Self::Disliked,
            _ => Self::None,
        }
    }

    const fn sign(self) -> Option<i16> {
        match self {
            Self::None => None,
            Self::Liked => Some(video_like::LIKE),
            Self::Disliked => Some(video_like::DISLIKE),
        }
    }

    /// State after pressing `reaction`. Pressing the active button clears it.
    #[must_use]
    pub const fn toggle(self, reaction: Reaction) -> Self {
        match (self, reaction) {
            (Self::Liked, Reaction::Like) | (Self::Disliked, Reaction::Dislike) => Self::None,
            (_, Reaction::Like) => Self::Liked,
            (_, Reaction::Dislike) => Self::Disliked,
        }
    }
}

/// Video like service for business logic.
#[derive(Clone)]
pub struct VideoLikeService {
    video_like_repo: VideoLikeRepository,
    video_repo: VideoRepository,
    id_gen: IdGenerator,
}

impl VideoLikeService {
    /// Create a new video like service.
    #[must_use]
    pub const fn new(video_like_repo: VideoLikeRepository, video_repo: VideoRepository) -> Self {
        Self {
            video_like_repo,
            video_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle a like on a video.
    pub async fn toggle_like(&self, user_id: &str, video_id: &str) -> AppResult<LikeState> {
        self.react(user_id, video_id, Reaction::Like).await
    }

    /// Toggle a dislike on a video.
    pub async fn toggle_dislike(&self, user_id: &str, video_id: &str) -> AppResult<LikeState> {
        self.react(user_id, video_id, Reaction::Dislike).await
    }

    async fn react(&self, user_id: &str, video_id: &str, reaction: Reaction) -> AppResult<LikeState> {
        self.video_repo.get_by_id(video_id).await?;

        let current = self.stored_state(user_id, video_id).await?;
        let next = current.toggle(reaction);

        let applied = match (current.sign(), next.sign()) {
            (None, Some(to)) => {
                let model = video_like::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    video_id: Set(video_id.to_string()),
                    like: Set(to),
                    created_at: Set(chrono::Utc::now().into()),
                    updated_at: Set(None),
                };
                self.video_like_repo.create(model).await?
            }
            (Some(from), None) => self.video_like_repo.delete(user_id, video_id, from).await?,
            (Some(from), Some(to)) => {
                self.video_like_repo
                    .update_like(user_id, video_id, from, to)
                    .await?
            }
            (None, None) => true,
        };

        if applied {
            return Ok(next);
        }

        // Another request changed the row between read and write.
        let stored = self.stored_state(user_id, video_id).await?;
        tracing::debug!(user_id = %user_id, video_id = %video_id, ?current, ?stored, "Like toggle lost a race");
        Ok(stored)
    }

    async fn stored_state(&self, user_id: &str, video_id: &str) -> AppResult<LikeState> {
        let like = self
            .video_like_repo
            .find_by_user_and_video(user_id, video_id)
            .await?;
        Ok(LikeState::from_sign(like.map(|l| l.like)))
    }
}
