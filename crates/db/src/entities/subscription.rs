//! Subscription entity (a user subscribed to another user's channel).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscription")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The subscribing user
    pub subscriber: String,

    /// The channel being subscribed to
    pub subscribe_to: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::Subscriber",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Subscriber,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SubscribeTo",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Channel,
}

impl ActiveModelBehavior for ActiveModel {}
