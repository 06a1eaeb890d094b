//! Video repository.

use std::sync::Arc;

use crate::entities::{Video, video};
use crate::repositories::grouped::{CountMap, count_grouped};
use crate::substring_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use vidtube_common::{AppError, AppResult};

/// Video repository for database operations.
#[derive(Clone)]
pub struct VideoRepository {
    db: Arc<DatabaseConnection>,
}

impl VideoRepository {
    /// Create a new video repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a video by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<video::Model>> {
        Video::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a video by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<video::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::VideoNotFound(id.to_string()))
    }

    /// Create a new video.
    pub async fn create(&self, model: video::ActiveModel) -> AppResult<video::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find videos by IDs. Order of the result is unspecified.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<video::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Video::find()
            .filter(video::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All videos, newest first.
    pub async fn find_recent(&self, limit: u64, offset: u64) -> AppResult<Vec<video::Model>> {
        Video::find()
            .order_by_desc(video::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Videos uploaded by any of `user_ids`, newest first.
    pub async fn find_by_users(
        &self,
        user_ids: &[String],
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<video::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        Video::find()
            .filter(video::Column::UserId.is_in(user_ids.to_vec()))
            .order_by_desc(video::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every video uploaded by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<video::Model>> {
        Video::find()
            .filter(video::Column::UserId.eq(user_id))
            .order_by_desc(video::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Videos whose title or description contains `term`, newest first.
    pub async fn search(&self, term: &str, limit: u64, offset: u64) -> AppResult<Vec<video::Model>> {
        let pattern = substring_pattern(term);

        Video::find()
            .filter(
                Condition::any()
                    .add(video::Column::Title.like(&pattern))
                    .add(video::Column::Description.like(&pattern)),
            )
            .order_by_desc(video::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of uploads per user.
    pub async fn count_by_users(&self, user_ids: &[String]) -> AppResult<CountMap> {
        count_grouped(
            self.db.as_ref(),
            Video::find(),
            video::Column::UserId,
            user_ids,
        )
        .await
    }
}
