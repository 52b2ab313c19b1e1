use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Movie: title lookups for search
        manager
            .create_index(
                Index::create()
                    .name("idx_movie_title")
                    .table(Movie::Table)
                    .col(Movie::Title)
                    .to_owned(),
            )
            .await?;

        // Score: per-user listing
        manager
            .create_index(
                Index::create()
                    .name("idx_score_user")
                    .table(Score::Table)
                    .col(Score::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_score_user").table(Score::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_movie_title").table(Movie::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Movie { Table, Title }

#[derive(DeriveIden)]
enum Score { Table, UserId }
