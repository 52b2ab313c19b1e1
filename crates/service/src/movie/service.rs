use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::domain::{MovieDto, MovieInput};
use super::repository::MovieRepository;
use crate::errors::{RepositoryError, ServiceError};
use crate::pagination::{Page, Pagination};

/// Application service encapsulating movie business rules.
/// Existence checks and constraint translation happen here, not in repositories.
pub struct MovieService<R: MovieRepository> {
    repo: Arc<R>,
}

impl<R: MovieRepository> MovieService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Page through movies whose title contains `title`.
    ///
    /// # Examples
    /// ```
    /// use service::movie::{MovieService, domain::MovieInput, repository::mock::MockMovieRepository};
    /// use service::pagination::Pagination;
    /// use std::sync::Arc;
    /// let svc = MovieService::new(Arc::new(MockMovieRepository::default()));
    /// let input = MovieInput { title: "The Matrix Resurrections".into(), release_year: Some(2021), image: "https://example.com/m.jpg".into() };
    /// tokio_test::block_on(svc.insert(input)).unwrap();
    /// let page = tokio_test::block_on(svc.find_all("matrix", Pagination::default())).unwrap();
    /// assert_eq!(page.total, 1);
    /// assert_eq!(page.items[0].title, "The Matrix Resurrections");
    /// ```
    pub async fn find_all(&self, title: &str, page: Pagination) -> Result<Page<MovieDto>, ServiceError> {
        let found = self.repo.search_by_title(title, page).await?;
        Ok(found.map(MovieDto::from))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<MovieDto, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(MovieDto::from)
            .ok_or_else(|| ServiceError::not_found("movie"))
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn insert(&self, input: MovieInput) -> Result<MovieDto, ServiceError> {
        let input = input.validated()?;
        let created = self.repo.insert(input).await?;
        info!(movie_id = created.id, "movie_created");
        Ok(created.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: MovieInput) -> Result<MovieDto, ServiceError> {
        match self.repo.get_reference_by_id(id).await {
            Ok(_) => {}
            Err(RepositoryError::NotFound(_)) => return Err(ServiceError::not_found("movie")),
            Err(e) => return Err(e.into()),
        }
        let saved = self.repo.update_details(id, input.validated()?).await?;
        info!(movie_id = saved.id, "movie_updated");
        Ok(saved.into())
    }

    /// Remove a movie. Movies that still have scores are kept and reported as a conflict.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.exists_by_id(id).await? {
            return Err(ServiceError::not_found("movie"));
        }
        match self.repo.delete_by_id(id).await {
            Ok(()) => {
                info!(movie_id = id, "movie_deleted");
                Ok(())
            }
            Err(RepositoryError::Constraint(detail)) => {
                warn!(movie_id = id, %detail, "movie_delete_blocked");
                Err(ServiceError::Conflict("referential integrity violation".into()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movie::domain::MovieRecord;
    use crate::movie::repository::mock::MockMovieRepository;

    const EXISTING_ID: i64 = 1;
    const NON_EXISTING_ID: i64 = 2;
    const DEPENDENT_ID: i64 = 3;

    fn movie(id: i64, title: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.into(),
            release_year: Some(2021),
            image: "https://www.themoviedb.org/t/p/w533_and_h300_bestv2/4q2hz2m8hubgvijz8Ez0T2Os2Yv.jpg".into(),
            score: 4.5,
            count: 2,
        }
    }

    fn input() -> MovieInput {
        MovieInput { title: "Test Movie".into(), release_year: Some(2021), image: "https://example.com/test.jpg".into() }
    }

    fn setup() -> (Arc<MockMovieRepository>, MovieService<MockMovieRepository>) {
        let repo = Arc::new(MockMovieRepository::with_movies([movie(EXISTING_ID, "Test Movie"), movie(DEPENDENT_ID, "Dependent Movie")]));
        repo.mark_dependent(DEPENDENT_ID);
        (repo.clone(), MovieService::new(repo))
    }

    #[tokio::test]
    async fn find_all_returns_paged_movie_dto() {
        let (_, svc) = setup();
        let page = svc.find_all("Test Movie", Pagination { page: 1, per_page: 12 }).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Test Movie");
    }

    #[tokio::test]
    async fn find_all_with_empty_filter_pages_everything() {
        let (_, svc) = setup();
        let first = svc.find_all("", Pagination { page: 1, per_page: 1 }).await.unwrap();
        assert_eq!(first.total, 2);
        assert_eq!(first.items[0].id, EXISTING_ID);
        let second = svc.find_all("", Pagination { page: 2, per_page: 1 }).await.unwrap();
        assert_eq!(second.offset, 1);
        assert_eq!(second.items[0].id, DEPENDENT_ID);
    }

    #[tokio::test]
    async fn find_by_id_returns_movie_dto_when_id_exists() {
        let (_, svc) = setup();
        let dto = svc.find_by_id(EXISTING_ID).await.unwrap();
        assert_eq!(dto.id, EXISTING_ID);
        assert_eq!(dto.title, "Test Movie");
        assert_eq!(dto.count, 2);
    }

    #[tokio::test]
    async fn find_by_id_fails_with_not_found_when_id_does_not_exist() {
        let (_, svc) = setup();
        let err = svc.find_by_id(NON_EXISTING_ID).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn insert_returns_movie_dto() {
        let (repo, svc) = setup();
        let dto = svc.insert(input()).await.unwrap();
        assert_eq!(dto.title, "Test Movie");
        assert_eq!(dto.score, 0.0);
        assert_eq!(dto.count, 0);
        assert_eq!(repo.snapshot(dto.id).map(|m| m.title), Some("Test Movie".to_string()));
    }

    #[tokio::test]
    async fn insert_rejects_invalid_title() {
        let (_, svc) = setup();
        let err = svc.insert(MovieInput { title: "Up".into(), ..input() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn update_returns_movie_dto_when_id_exists() {
        let (repo, svc) = setup();
        let dto = svc.update(EXISTING_ID, MovieInput { title: "Test Movie Updated".into(), ..input() }).await.unwrap();
        assert_eq!(dto.id, EXISTING_ID);
        assert_eq!(dto.title, "Test Movie Updated");
        // aggregate survives an edit
        assert_eq!(dto.score, 4.5);
        assert_eq!(repo.update_calls(), 1);
    }

    #[tokio::test]
    async fn update_keeps_aggregate_written_after_it_was_read() {
        let (repo, svc) = setup();
        let stale = repo.get_reference_by_id(EXISTING_ID).await.unwrap();
        assert_eq!(stale.count, 2);
        // a vote lands between the read and the edit
        repo.write_aggregate(EXISTING_ID, 4.0, 3);
        let dto = svc.update(EXISTING_ID, MovieInput { title: "Test Movie Renamed".into(), ..input() }).await.unwrap();
        assert_eq!(dto.title, "Test Movie Renamed");
        assert_eq!((dto.score, dto.count), (4.0, 3));
        assert_eq!(repo.snapshot(EXISTING_ID).map(|m| m.count), Some(3));
    }

    #[tokio::test]
    async fn update_rejects_invalid_input_without_writing() {
        let (repo, svc) = setup();
        let err = svc.update(EXISTING_ID, MovieInput { image: "ftp://example.com/x.jpg".into(), ..input() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(repo.update_calls(), 0);
    }

    #[tokio::test]
    async fn update_fails_with_not_found_when_id_does_not_exist() {
        let (repo, svc) = setup();
        let err = svc.update(NON_EXISTING_ID, input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(repo.update_calls(), 0);
    }

    #[tokio::test]
    async fn delete_does_nothing_when_id_exists() {
        let (repo, svc) = setup();
        svc.delete(EXISTING_ID).await.unwrap();
        assert_eq!(repo.delete_calls(EXISTING_ID), 1);
        assert!(repo.snapshot(EXISTING_ID).is_none());
    }

    #[tokio::test]
    async fn delete_fails_with_not_found_when_id_does_not_exist() {
        let (repo, svc) = setup();
        let err = svc.delete(NON_EXISTING_ID).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(repo.delete_calls(NON_EXISTING_ID), 0);
    }

    #[tokio::test]
    async fn delete_fails_with_conflict_when_dependent_id() {
        let (repo, svc) = setup();
        let err = svc.delete(DEPENDENT_ID).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(repo.delete_calls(DEPENDENT_ID), 1);
        assert!(repo.snapshot(DEPENDENT_ID).is_some());
    }
}
