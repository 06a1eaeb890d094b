//! Create video table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Video::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Video::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Video::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Video::Description).text())
                    .col(ColumnDef::new(Video::Url).string_len(1024).not_null())
                    .col(ColumnDef::new(Video::Thumbnail).string_len(1024).not_null())
                    .col(ColumnDef::new(Video::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Video::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Video::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_user")
                            .from(Video::Table, Video::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (channel listings and video counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_video_user_id")
                    .table(Video::Table)
                    .col(Video::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (newest-first listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_video_created_at")
                    .table(Video::Table)
                    .col(Video::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Video::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Video {
    Table,
    Id,
    Title,
    Description,
    Url,
    Thumbnail,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
