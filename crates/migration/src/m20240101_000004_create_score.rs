//! Create `score` table.
//!
//! Composite primary key (movie_id, user_id): one score per user per movie.
//! Neither a movie nor a user with scores can be deleted (RESTRICT), so no
//! score row disappears without its movie aggregate being recomputed.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Score::Table)
                    .if_not_exists()
                    .col(big_integer(Score::MovieId).not_null())
                    .col(big_integer(Score::UserId).not_null())
                    .col(double(Score::Value).not_null())
                    .col(timestamp_with_time_zone(Score::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Score::UpdatedAt).not_null())
                    .primary_key(Index::create().col(Score::MovieId).col(Score::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_score_movie")
                            .from(Score::Table, Score::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_score_user")
                            .from(Score::Table, Score::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Score::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Score { Table, MovieId, UserId, Value, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Movie { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
