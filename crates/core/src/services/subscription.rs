//! Subscription service.

use sea_orm::Set;
use vidtube_common::{AppError, AppResult, IdGenerator};
use vidtube_db::{
    entities::subscription,
    repositories::{SubscriptionRepository, UserRepository},
};

/// Resulting state after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Subscribed,
    Unsubscribed,
}

/// Subscription service for business logic.
#[derive(Clone)]
pub struct SubscriptionService {
    subscription_repo: SubscriptionRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl SubscriptionService {
    /// Create a new subscription service.
    #[must_use]
    pub const fn new(subscription_repo: SubscriptionRepository, user_repo: UserRepository) -> Self {
        Self {
            subscription_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Subscribe to `channel_id` if not subscribed, otherwise unsubscribe.
    pub async fn toggle(
        &self,
        subscriber_id: &str,
        channel_id: &str,
    ) -> AppResult<SubscriptionState> {
        if subscriber_id == channel_id {
            return Err(AppError::BadRequest(
                "You cannot to subscribe to your own channel".to_string(),
            ));
        }

        self.user_repo.get_by_id(channel_id).await?;

        // Both branches are single conditional writes on the unique pair index.
        if self
            .subscription_repo
            .unsubscribe(subscriber_id, channel_id)
            .await?
        {
            tracing::debug!(subscriber = %subscriber_id, channel = %channel_id, "Unsubscribed");
            return Ok(SubscriptionState::Unsubscribed);
        }

        let model = subscription::ActiveModel {
            id: Set(self.id_gen.generate()),
            subscriber: Set(subscriber_id.to_string()),
            subscribe_to: Set(channel_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.subscription_repo.subscribe(model).await?;

        tracing::debug!(subscriber = %subscriber_id, channel = %channel_id, "Subscribed");
        Ok(SubscriptionState::Subscribed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use vidtube_db::entities::user;

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

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(sub_db: MockDatabase, user_db: MockDatabase) -> SubscriptionService {
        SubscriptionService::new(
            SubscriptionRepository::new(Arc::new(sub_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_self_subscription_rejected_before_lookup() {
        // Neither mock has results queued; any query would fail the test.
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.toggle("user1", "user1").await;

        match result {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "You cannot to subscribe to your own channel");
            }
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_unknown_channel_is_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service.toggle("user1", "ghost").await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "ghost"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        // First toggle: nothing to delete, insert. Second: delete succeeds.
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
                exec(0),
                exec(1),
                exec(1),
            ]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user2")], [create_test_user("user2")]]),
        );

        assert_eq!(
            service.toggle("user1", "user2").await.unwrap(),
            SubscriptionState::Subscribed
        );
        assert_eq!(
            service.toggle("user1", "user2").await.unwrap(),
            SubscriptionState::Unsubscribed
        );
    }
}
