//! Video like/dislike repository.
//!
//! A row exists only while the user likes (`like = 1`) or dislikes (`like = -1`)
//! the video. Writes are conditional on the current sign so concurrent toggles
//! never produce a second row.

use std::sync::Arc;

use crate::entities::{VideoLike, video_like};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::{Expr, OnConflict},
};
use vidtube_common::{AppError, AppResult};

/// Video like repository for database operations.
#[derive(Clone)]
pub struct VideoLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl VideoLikeRepository {
    /// Create a new video like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the like row of a user on a video.
    pub async fn find_by_user_and_video(
        &self,
        user_id: &str,
        video_id: &str,
    ) -> AppResult<Option<video_like::Model>> {
        VideoLike::find()
            .filter(video_like::Column::UserId.eq(user_id))
            .filter(video_like::Column::VideoId.eq(video_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a like row unless the user already has one on the video.
    ///
    /// Returns `false` when a row was already present.
    pub async fn create(&self, model: video_like::ActiveModel) -> AppResult<bool> {
        let inserted = VideoLike::insert(model)
            .on_conflict(
                OnConflict::columns([video_like::Column::UserId, video_like::Column::VideoId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Flip the sign of an existing row from `from` to `to`.
    ///
    /// Returns `false` when no row with sign `from` exists.
    pub async fn update_like(
        &self,
        user_id: &str,
        video_id: &str,
        from: i16,
        to: i16,
    ) -> AppResult<bool> {
        let result = VideoLike::update_many()
            .col_expr(video_like::Column::Like, Expr::value(to))
            .col_expr(
                video_like::Column::UpdatedAt,
                Expr::value(chrono::Utc::now().fixed_offset()),
            )
            .filter(video_like::Column::UserId.eq(user_id))
            .filter(video_like::Column::VideoId.eq(video_id))
            .filter(video_like::Column::Like.eq(from))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Delete the row of a user on a video if it carries sign `like`.
    pub async fn delete(&self, user_id: &str, video_id: &str, like: i16) -> AppResult<bool> {
        let result = VideoLike::delete_many()
            .filter(video_like::Column::UserId.eq(user_id))
            .filter(video_like::Column::VideoId.eq(video_id))
            .filter(video_like::Column::Like.eq(like))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Count rows with sign `like` on a video.
    pub async fn count_by_video(&self, video_id: &str, like: i16) -> AppResult<u64> {
        VideoLike::find()
            .filter(video_like::Column::VideoId.eq(video_id))
            .filter(video_like::Column::Like.eq(like))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of the videos a user liked, oldest like first.
    pub async fn find_liked_video_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        VideoLike::find()
            .filter(video_like::Column::UserId.eq(user_id))
            .filter(video_like::Column::Like.eq(video_like::LIKE))
            .order_by_asc(video_like::Column::CreatedAt)
            .select_only()
            .column(video_like::Column::VideoId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set, Value};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_video() {
        let like = video_like::Model {
            id: "l1".to_string(),
            user_id: "user1".to_string(),
            video_id: "v1".to_string(),
            like: video_like::DISLIKE,
            created_at: Utc::now().into(),
            updated_at: None,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like]])
                .into_connection(),
        );

        let repo = VideoLikeRepository::new(db);
        let found = repo.find_by_user_and_video("user1", "v1").await.unwrap();

        assert_eq!(found.map(|l| l.like), Some(video_like::DISLIKE));
    }

    #[tokio::test]
    async fn test_create_conflict_reports_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(0)])
                .into_connection(),
        );

        let repo = VideoLikeRepository::new(db);
        let model = || video_like::ActiveModel {
            id: Set("l1".to_string()),
            user_id: Set("user1".to_string()),
            video_id: Set("v1".to_string()),
            like: Set(video_like::LIKE),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        assert!(repo.create(model()).await.unwrap());
        assert!(!repo.create(model()).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_like_and_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1), exec(0)])
                .into_connection(),
        );

        let repo = VideoLikeRepository::new(db);

        assert!(
            repo.update_like("user1", "v1", video_like::DISLIKE, video_like::LIKE)
                .await
                .unwrap()
        );
        assert!(repo.delete("user1", "v1", video_like::LIKE).await.unwrap());
        assert!(!repo.delete("user1", "v1", video_like::LIKE).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_by_video() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Value::BigInt(Some(2))
                }]])
                .into_connection(),
        );

        let repo = VideoLikeRepository::new(db);
        assert_eq!(
            repo.count_by_video("v1", video_like::LIKE).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_find_liked_video_ids() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! { "video_id" => Value::from("v3".to_string()) },
                    btreemap! { "video_id" => Value::from("v1".to_string()) },
                ]])
                .into_connection(),
        );

        let repo = VideoLikeRepository::new(db);
        let ids = repo.find_liked_video_ids("user1").await.unwrap();

        assert_eq!(ids, vec!["v3".to_string(), "v1".to_string()]);
    }
}
