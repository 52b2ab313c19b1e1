use async_trait::async_trait;

use super::domain::ScoreRecord;
use crate::errors::RepositoryError;
use crate::movie::domain::MovieRecord;

/// Repository abstraction for score persistence.
///
/// A vote reads the score set and rewrites the movie aggregate, so every write
/// goes through a [`ScoreTransaction`].
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    type Tx: ScoreTransaction;

    /// Open a unit of work. Dropping it without [`ScoreTransaction::commit`] discards its writes.
    async fn begin(&self) -> Result<Self::Tx, RepositoryError>;
    async fn find_by_movie(&self, movie_id: i64) -> Result<Vec<ScoreRecord>, RepositoryError>;
}

#[async_trait]
pub trait ScoreTransaction: Send {
    /// Load the movie and keep other votes on it waiting until this transaction ends.
    async fn lock_movie(&mut self, movie_id: i64) -> Result<Option<MovieRecord>, RepositoryError>;
    async fn find_by_movie(&mut self, movie_id: i64) -> Result<Vec<ScoreRecord>, RepositoryError>;
    /// Insert or overwrite the (movie, user) row and return it as stored.
    async fn save_and_flush(&mut self, score: ScoreRecord) -> Result<ScoreRecord, RepositoryError>;
    /// Write the movie's `score` and `count`; other columns are left alone.
    async fn save_aggregate(&mut self, movie_id: i64, score: f64, count: i32) -> Result<MovieRecord, RepositoryError>;
    async fn commit(self) -> Result<(), RepositoryError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::movie::repository::mock::MockMovieRepository;

    type ScoreMap = BTreeMap<(i64, i64), ScoreRecord>; // key: (movie_id, user_id)

    /// Scores next to a shared movie store. Transactions are serialised by one
    /// async lock and stage their writes until `commit`.
    pub struct MockScoreRepository {
        movies: Arc<MockMovieRepository>,
        scores: Arc<Mutex<ScoreMap>>,
        gate: Arc<tokio::sync::Mutex<()>>,
        fail_aggregate: AtomicBool,
    }

    impl MockScoreRepository {
        pub fn new(movies: Arc<MockMovieRepository>) -> Self {
            Self { movies, scores: Arc::default(), gate: Arc::default(), fail_aggregate: AtomicBool::new(false) }
        }

        /// Make every later `save_aggregate` fail with a database error.
        pub fn fail_aggregate_writes(&self) {
            self.fail_aggregate.store(true, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.scores.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn values(&self, movie_id: i64) -> Vec<f64> {
            self.scores.lock().unwrap().values().filter(|s| s.movie_id == movie_id).map(|s| s.value).collect()
        }
    }

    pub struct MockScoreTransaction {
        movies: Arc<MockMovieRepository>,
        scores: Arc<Mutex<ScoreMap>>,
        gate: Arc<tokio::sync::Mutex<()>>,
        held: Option<tokio::sync::OwnedMutexGuard<()>>,
        fail_aggregate: bool,
        staged_scores: Vec<ScoreRecord>,
        staged_aggregate: Option<MovieRecord>,
    }

    impl MockScoreTransaction {
        fn visible(&self, movie_id: i64) -> Vec<ScoreRecord> {
            let mut view: ScoreMap =
                self.scores.lock().unwrap().iter().filter(|(k, _)| k.0 == movie_id).map(|(k, v)| (*k, v.clone())).collect();
            for s in self.staged_scores.iter().filter(|s| s.movie_id == movie_id) {
                view.insert((s.movie_id, s.user_id), s.clone());
            }
            view.into_values().collect()
        }
    }

    #[async_trait]
    impl ScoreRepository for MockScoreRepository {
        type Tx = MockScoreTransaction;

        async fn begin(&self) -> Result<MockScoreTransaction, RepositoryError> {
            Ok(MockScoreTransaction {
                movies: self.movies.clone(),
                scores: self.scores.clone(),
                gate: self.gate.clone(),
                held: None,
                fail_aggregate: self.fail_aggregate.load(Ordering::SeqCst),
                staged_scores: Vec::new(),
                staged_aggregate: None,
            })
        }

        async fn find_by_movie(&self, movie_id: i64) -> Result<Vec<ScoreRecord>, RepositoryError> {
            let scores = self.scores.lock().unwrap();
            Ok(scores.values().filter(|s| s.movie_id == movie_id).cloned().collect())
        }
    }

    #[async_trait]
    impl ScoreTransaction for MockScoreTransaction {
        async fn lock_movie(&mut self, movie_id: i64) -> Result<Option<MovieRecord>, RepositoryError> {
            if self.held.is_none() {
                self.held = Some(self.gate.clone().lock_owned().await);
            }
            Ok(self.movies.snapshot(movie_id))
        }

        async fn find_by_movie(&mut self, movie_id: i64) -> Result<Vec<ScoreRecord>, RepositoryError> {
            // give concurrent voters a chance to run between read and write
            tokio::task::yield_now().await;
            Ok(self.visible(movie_id))
        }

        async fn save_and_flush(&mut self, score: ScoreRecord) -> Result<ScoreRecord, RepositoryError> {
            self.staged_scores.push(score.clone());
            Ok(score)
        }

        async fn save_aggregate(&mut self, movie_id: i64, score: f64, count: i32) -> Result<MovieRecord, RepositoryError> {
            if self.fail_aggregate {
                return Err(RepositoryError::Db("connection reset".into()));
            }
            let mut movie = self.movies.snapshot(movie_id).ok_or_else(|| RepositoryError::NotFound("movie".into()))?;
            movie.score = score;
            movie.count = count;
            self.staged_aggregate = Some(movie.clone());
            Ok(movie)
        }

        async fn commit(self) -> Result<(), RepositoryError> {
            let mut scores = self.scores.lock().unwrap();
            for s in self.staged_scores {
                scores.insert((s.movie_id, s.user_id), s);
            }
            if let Some(m) = self.staged_aggregate {
                self.movies.write_aggregate(m.id, m.score, m.count);
            }
            Ok(())
        }
    }
}
