use std::sync::Arc;
use tracing::{info, instrument};

use super::domain::{ScoreDto, ScoreRecord, ScoreSet};
use super::repository::{ScoreRepository, ScoreTransaction};
use crate::errors::ServiceError;
use crate::movie::domain::MovieDto;
use crate::user_service::UserService;

/// Records votes and keeps each movie's average and count current.
pub struct ScoreService<U: UserService, S: ScoreRepository> {
    users: Arc<U>,
    scores: Arc<S>,
}

impl<U: UserService, S: ScoreRepository> ScoreService<U, S> {
    pub fn new(users: Arc<U>, scores: Arc<S>) -> Self { Self { users, scores } }

    /// Save the caller's score for a movie and return the movie with its new aggregate.
    ///
    /// The movie lookup, score upsert and aggregate write share one transaction;
    /// any error rolls all of them back.
    ///
    /// # Examples
    /// ```
    /// use service::score::{ScoreService, domain::ScoreDto, repository::mock::MockScoreRepository};
    /// use service::movie::{domain::MovieRecord, repository::mock::MockMovieRepository};
    /// use service::user_service::mock::FixedUserService;
    /// use std::sync::Arc;
    /// let movies = Arc::new(MockMovieRepository::with_movies([MovieRecord {
    ///     id: 1, title: "The Witcher".into(), release_year: Some(2019), image: "https://example.com/w.jpg".into(), score: 0.0, count: 0,
    /// }]));
    /// let svc = ScoreService::new(Arc::new(FixedUserService::client(1, "maria@gmail.com")), Arc::new(MockScoreRepository::new(movies)));
    /// let movie = tokio_test::block_on(svc.save_score(ScoreDto { movie_id: 1, score: 4.5 })).unwrap();
    /// assert_eq!(movie.count, 1);
    /// assert_eq!(movie.score, 4.5);
    /// ```
    #[instrument(skip(self, dto), fields(movie_id = dto.movie_id))]
    pub async fn save_score(&self, dto: ScoreDto) -> Result<MovieDto, ServiceError> {
        let user = self.users.authenticated().await?;

        let mut tx = self.scores.begin().await?;
        let movie = tx
            .lock_movie(dto.movie_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("movie"))?;
        models::score::validate_value(dto.score)?;

        let mut set = ScoreSet::from_records(tx.find_by_movie(movie.id).await?);
        set.upsert(user.id, dto.score);
        tx.save_and_flush(ScoreRecord { movie_id: movie.id, user_id: user.id, value: dto.score }).await?;
        let saved = tx.save_aggregate(movie.id, set.average(), set.count()).await?;
        tx.commit().await?;

        info!(movie_id = saved.id, user_id = user.id, score = saved.score, count = saved.count, "score_saved");
        Ok(saved.into())
    }
}
