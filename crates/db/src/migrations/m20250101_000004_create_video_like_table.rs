//! Create video like table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VideoLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VideoLike::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VideoLike::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(VideoLike::VideoId).string_len(32).not_null())
                    .col(ColumnDef::new(VideoLike::Like).small_integer().not_null())
                    .col(
                        ColumnDef::new(VideoLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(VideoLike::UpdatedAt).timestamp_with_time_zone())
                    .check(Expr::col(VideoLike::Like).is_in([1, -1]))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_like_user")
                            .from(VideoLike::Table, VideoLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_like_video")
                            .from(VideoLike::Table, VideoLike::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, video_id) - a user either likes or dislikes, never both
        manager
            .create_index(
                Index::create()
                    .name("idx_video_like_user_video")
                    .table(VideoLike::Table)
                    .col(VideoLike::UserId)
                    .col(VideoLike::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (video_id, like) - like/dislike counts per video
        manager
            .create_index(
                Index::create()
                    .name("idx_video_like_video_like")
                    .table(VideoLike::Table)
                    .col(VideoLike::VideoId)
                    .col(VideoLike::Like)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VideoLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VideoLike {
    Table,
    Id,
    UserId,
    VideoId,
    Like,
    CreatedAt,
    UpdatedAt,
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
