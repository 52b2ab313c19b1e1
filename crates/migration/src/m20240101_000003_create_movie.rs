//! Create `movie` table.
//!
//! `score` and `count` hold the aggregate over the `score` rows of the movie.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movie::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(string_len(Movie::Title, 80).not_null())
                    .col(integer_null(Movie::ReleaseYear))
                    .col(string_len(Movie::Image, 512).not_null())
                    .col(double(Movie::Score).not_null().default(0.0))
                    .col(integer(Movie::Count).not_null().default(0))
                    .col(timestamp_with_time_zone(Movie::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Movie::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Movie { Table, Id, Title, ReleaseYear, Image, Score, Count, CreatedAt, UpdatedAt }
