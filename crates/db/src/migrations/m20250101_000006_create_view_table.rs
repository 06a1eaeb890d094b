//! Create view table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(View::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(View::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(View::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(View::VideoId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(View::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_view_user")
                            .from(View::Table, View::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_view_video")
                            .from(View::Table, View::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, video_id) - one view per user per video
        manager
            .create_index(
                Index::create()
                    .name("idx_view_user_video")
                    .table(View::Table)
                    .col(View::UserId)
                    .col(View::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: video_id (view counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_view_video_id")
                    .table(View::Table)
                    .col(View::VideoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(View::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum View {
    Table,
    Id,
    UserId,
    VideoId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Video {
    Table,
    Id,
}
