//! View recording.

use sea_orm::Set;
use vidtube_common::{AppError, AppResult, IdGenerator};
use vidtube_db::{
    entities::view,
    repositories::{VideoRepository, ViewRepository},
};

/// View service for business logic.
#[derive(Clone)]
pub struct ViewService {
    view_repo: ViewRepository,
    video_repo: VideoRepository,
    id_gen: IdGenerator,
}

impl ViewService {
    /// Create a new view service.
    #[must_use]
    pub const fn new(view_repo: ViewRepository, video_repo: VideoRepository) -> Self {
        Self {
            view_repo,
            video_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record that `user_id` watched a video. Each user counts once per video.
    pub async fn record_view(&self, user_id: &str, video_id: &str) -> AppResult<()> {
        self.video_repo.get_by_id(video_id).await?;

        let model = view::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            video_id: Set(video_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        if !self.view_repo.record(model).await? {
            return Err(AppError::Conflict(
                "You already viewed this video".to_string(),
            ));
        }

        Ok(())
    }
}
