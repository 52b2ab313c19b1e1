use sea_orm::{DatabaseConnection, DatabaseTransaction, EntityTrait, QuerySelect, TransactionTrait};

use crate::errors::RepositoryError;
use crate::movie::domain::MovieRecord;
use crate::score::domain::ScoreRecord;
use crate::score::repository::{ScoreRepository, ScoreTransaction};

pub struct SeaOrmScoreRepository {
    pub db: DatabaseConnection,
}

/// A vote in flight. The movie row stays `FOR UPDATE` locked until commit or drop.
pub struct SeaOrmScoreTransaction {
    txn: DatabaseTransaction,
}

#[async_trait::async_trait]
impl ScoreRepository for SeaOrmScoreRepository {
    type Tx = SeaOrmScoreTransaction;

    async fn begin(&self) -> Result<SeaOrmScoreTransaction, RepositoryError> {
        Ok(SeaOrmScoreTransaction { txn: self.db.begin().await? })
    }

    async fn find_by_movie(&self, movie_id: i64) -> Result<Vec<ScoreRecord>, RepositoryError> {
        let rows = models::score::list_by_movie(&self.db, movie_id).await?;
        Ok(rows.into_iter().map(ScoreRecord::from).collect())
    }
}

#[async_trait::async_trait]
impl ScoreTransaction for SeaOrmScoreTransaction {
    async fn lock_movie(&mut self, movie_id: i64) -> Result<Option<MovieRecord>, RepositoryError> {
        let found = models::movie::Entity::find_by_id(movie_id).lock_exclusive().one(&self.txn).await?;
        Ok(found.map(MovieRecord::from))
    }

    async fn find_by_movie(&mut self, movie_id: i64) -> Result<Vec<ScoreRecord>, RepositoryError> {
        let rows = models::score::list_by_movie(&self.txn, movie_id).await?;
        Ok(rows.into_iter().map(ScoreRecord::from).collect())
    }

    async fn save_and_flush(&mut self, score: ScoreRecord) -> Result<ScoreRecord, RepositoryError> {
        let saved = models::score::upsert(&self.txn, score.movie_id, score.user_id, score.value).await?;
        Ok(saved.into())
    }

    async fn save_aggregate(&mut self, movie_id: i64, score: f64, count: i32) -> Result<MovieRecord, RepositoryError> {
        models::movie::write_aggregate(&self.txn, movie_id, score, count)
            .await?
            .map(MovieRecord::from)
            .ok_or_else(|| RepositoryError::NotFound("movie".into()))
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.txn.commit().await?;
        Ok(())
    }
}
