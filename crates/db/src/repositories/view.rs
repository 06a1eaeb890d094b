//! View repository.

use std::sync::Arc;

use crate::entities::{View, view};
use crate::repositories::grouped::{CountMap, count_grouped};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::OnConflict,
};
use vidtube_common::{AppError, AppResult};

/// View repository for database operations.
#[derive(Clone)]
pub struct ViewRepository {
    db: Arc<DatabaseConnection>,
}

impl ViewRepository {
    /// Create a new view repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record a view unless the user already viewed the video.
    ///
    /// Returns `false` when the `(user_id, video_id)` row already exists.
    pub async fn record(&self, model: view::ActiveModel) -> AppResult<bool> {
        let inserted = View::insert(model)
            .on_conflict(
                OnConflict::columns([view::Column::UserId, view::Column::VideoId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Check if a user viewed a video.
    pub async fn has_viewed(&self, user_id: &str, video_id: &str) -> AppResult<bool> {
        let count = View::find()
            .filter(view::Column::UserId.eq(user_id))
            .filter(view::Column::VideoId.eq(video_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Count views of a video.
    pub async fn count_by_video(&self, video_id: &str) -> AppResult<u64> {
        View::find()
            .filter(view::Column::VideoId.eq(video_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// View counts for a batch of videos.
    pub async fn count_by_videos(&self, video_ids: &[String]) -> AppResult<CountMap> {
        count_grouped(
            self.db.as_ref(),
            View::find(),
            view::Column::VideoId,
            video_ids,
        )
        .await
    }

    /// IDs of the videos a user viewed, oldest view first.
    pub async fn find_viewed_video_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        View::find()
            .filter(view::Column::UserId.eq(user_id))
            .order_by_asc(view::Column::CreatedAt)
            .select_only()
            .column(view::Column::VideoId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
