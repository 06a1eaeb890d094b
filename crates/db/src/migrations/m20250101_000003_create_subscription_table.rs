//! Create subscription table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscription::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscription::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscription::Subscriber).string_len(32).not_null())
                    .col(ColumnDef::new(Subscription::SubscribeTo).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Subscription::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_subscriber")
                            .from(Subscription::Table, Subscription::Subscriber)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_subscribe_to")
                            .from(Subscription::Table, Subscription::SubscribeTo)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (subscriber, subscribe_to) - one subscription per channel
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_subscriber_subscribe_to")
                    .table(Subscription::Table)
                    .col(Subscription::Subscriber)
                    .col(Subscription::SubscribeTo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: subscribe_to (subscriber counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_subscribe_to")
                    .table(Subscription::Table)
                    .col(Subscription::SubscribeTo)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscription::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Subscription {
    Table,
    Id,
    Subscriber,
    SubscribeTo,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
