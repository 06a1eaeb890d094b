//! Subscription repository.

use std::sync::Arc;

use crate::entities::{Subscription, subscription};
use crate::repositories::grouped::{CountMap, count_grouped};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::OnConflict,
};
use vidtube_common::{AppError, AppResult};

/// Subscription repository for database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a subscription by subscriber and channel.
    pub async fn find_by_pair(
        &self,
        subscriber: &str,
        channel: &str,
    ) -> AppResult<Option<subscription::Model>> {
        Subscription::find()
            .filter(subscription::Column::Subscriber.eq(subscriber))
            .filter(subscription::Column::SubscribeTo.eq(channel))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is subscribed to a channel.
    pub async fn is_subscribed(&self, subscriber: &str, channel: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(subscriber, channel).await?.is_some())
    }

    /// Insert a subscription unless the pair already exists.
    ///
    /// Returns `false` when the row was already present.
    pub async fn subscribe(&self, model: subscription::ActiveModel) -> AppResult<bool> {
        let inserted = Subscription::insert(model)
            .on_conflict(
                OnConflict::columns([
                    subscription::Column::Subscriber,
                    subscription::Column::SubscribeTo,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Delete the subscription for a pair.
    ///
    /// Returns `false` when there was nothing to delete.
    pub async fn unsubscribe(&self, subscriber: &str, channel: &str) -> AppResult<bool> {
        let result = Subscription::delete_many()
            .filter(subscription::Column::Subscriber.eq(subscriber))
            .filter(subscription::Column::SubscribeTo.eq(channel))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// IDs of the channels a user subscribes to, in subscription order.
    pub async fn find_channel_ids(&self, subscriber: &str) -> AppResult<Vec<String>> {
        Subscription::find()
            .filter(subscription::Column::Subscriber.eq(subscriber))
            .order_by_asc(subscription::Column::CreatedAt)
            .select_only()
            .column(subscription::Column::SubscribeTo)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The subset of `channel_ids` that `subscriber` subscribes to.
    pub async fn find_subscribed_among(
        &self,
        subscriber: &str,
        channel_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if channel_ids.is_empty() {
            return Ok(vec![]);
        }

        Subscription::find()
            .filter(subscription::Column::Subscriber.eq(subscriber))
            .filter(subscription::Column::SubscribeTo.is_in(channel_ids.to_vec()))
            .select_only()
            .column(subscription::Column::SubscribeTo)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count subscribers of a channel.
    pub async fn count_subscribers(&self, channel: &str) -> AppResult<u64> {
        Subscription::find()
            .filter(subscription::Column::SubscribeTo.eq(channel))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Subscriber counts for a batch of channels.
    pub async fn count_by_channels(&self, channel_ids: &[String]) -> AppResult<CountMap> {
        count_grouped(
            self.db.as_ref(),
            Subscription::find(),
            subscription::Column::SubscribeTo,
            channel_ids,
        )
        .await
    }
}
