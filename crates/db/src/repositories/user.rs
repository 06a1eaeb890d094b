//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use crate::substring_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};
use vidtube_common::{AppError, AppResult};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs. Order of the result is unspecified.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by bearer token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    ///
    /// A unique index violation comes back as [`AppError::Conflict`] carrying
    /// the database message, which names the index.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(write_error)
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.update(self.db.as_ref()).await.map_err(write_error)
    }

    /// Users whose username contains `term`, oldest accounts first.
    pub async fn search_by_username(&self, term: &str) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Username.like(substring_pattern(term)))
            .order_by_asc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Newest users other than `exclude_id`.
    pub async fn find_recommended(
        &self,
        exclude_id: &str,
        limit: u64,
    ) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Id.ne(exclude_id))
            .order_by_desc(user::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Map a failed user write, keeping unique violations distinguishable.
fn write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
        _ => AppError::Database(err.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Set};

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            firstname: "Test".to_string(),
            lastname: "User".to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "hash".to_string(),
            token: Some(format!("token-{id}")),
            channel_description: None,
            avatar: None,
            cover: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user("user1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id("user1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("missing").await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let user = create_test_user("user1", "alice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_token("token-user1").await.unwrap();

        assert_eq!(result.map(|u| u.id), Some("user1".to_string()));
    }

    #[tokio::test]
    async fn test_search_by_username() {
        let u1 = create_test_user("user1", "alice");
        let u2 = create_test_user("user2", "malice");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[u1, u2]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.search_by_username("lic").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].username, "malice");
    }

    #[tokio::test]
    async fn test_find_recommended() {
        let u2 = create_test_user("user2", "bob");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[u2]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_recommended("user1", 10).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "user2");
    }

    #[tokio::test]
    async fn test_update() {
        let mut updated = create_test_user("user1", "alice");
        updated.channel_description = Some("cooking".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[updated.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let model = user::ActiveModel {
            id: Set("user1".to_string()),
            channel_description: Set(Some("cooking".to_string())),
            ..Default::default()
        };
        let result = repo.update(model).await.unwrap();

        assert_eq!(result.channel_description.as_deref(), Some("cooking"));
    }

    #[test]
    fn test_write_error_without_unique_violation_is_database() {
        match write_error(DbErr::Custom("connection reset".to_string())) {
            AppError::Database(msg) => assert!(msg.contains("connection reset")),
            other => panic!("Expected Database error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_failure_is_database_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("disk full".to_string())])
                .into_connection(),
        );
        let repo = UserRepository::new(db);
        let user = create_test_user("user1", "alice");

        let active = user::ActiveModel {
            id: Set(user.id),
            firstname: Set(user.firstname),
            lastname: Set(user.lastname),
            username: Set(user.username),
            email: Set(user.email),
            password: Set(user.password),
            token: Set(user.token),
            channel_description: Set(None),
            avatar: Set(None),
            cover: Set(None),
            created_at: Set(user.created_at),
            updated_at: Set(None),
        };

        assert!(matches!(
            repo.create(active).await,
            Err(AppError::Database(_))
        ));
    }
}
