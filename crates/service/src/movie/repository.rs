use async_trait::async_trait;

use super::domain::{MovieInput, MovieRecord};
use crate::errors::RepositoryError;
use crate::pagination::{Page, Pagination};

/// Repository abstraction for movie persistence.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<MovieRecord>, RepositoryError>;
    /// Case-insensitive substring match on title; an empty filter matches everything.
    async fn search_by_title(&self, title: &str, page: Pagination) -> Result<Page<MovieRecord>, RepositoryError>;
    async fn insert(&self, input: MovieInput) -> Result<MovieRecord, RepositoryError>;
    /// Overwrite title, release year and image. The aggregate is only ever
    /// written by a vote, so it is left as stored.
    async fn update_details(&self, id: i64, input: MovieInput) -> Result<MovieRecord, RepositoryError>;
    /// Like `find_by_id` but absence is an error (`RepositoryError::NotFound`).
    async fn get_reference_by_id(&self, id: i64) -> Result<MovieRecord, RepositoryError>;
    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError>;
    /// Fails with `RepositoryError::Constraint` while scores still reference the movie.
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockMovieRepository {
        movies: Mutex<BTreeMap<i64, MovieRecord>>,
        dependent: Mutex<HashSet<i64>>, // ids still referenced by scores
        delete_calls: Mutex<Vec<i64>>,
        update_calls: Mutex<usize>,
    }

    impl MockMovieRepository {
        pub fn with_movies(movies: impl IntoIterator<Item = MovieRecord>) -> Self {
            let repo = Self::default();
            repo.movies.lock().unwrap().extend(movies.into_iter().map(|m| (m.id, m)));
            repo
        }

        /// Mark an id as referenced so deleting it violates the constraint.
        pub fn mark_dependent(&self, id: i64) {
            self.dependent.lock().unwrap().insert(id);
        }

        pub fn delete_calls(&self, id: i64) -> usize {
            self.delete_calls.lock().unwrap().iter().filter(|x| **x == id).count()
        }

        pub fn update_calls(&self) -> usize {
            *self.update_calls.lock().unwrap()
        }

        pub fn snapshot(&self, id: i64) -> Option<MovieRecord> {
            self.movies.lock().unwrap().get(&id).cloned()
        }

        /// Store a new aggregate, as a committed vote would.
        pub fn write_aggregate(&self, id: i64, score: f64, count: i32) {
            if let Some(m) = self.movies.lock().unwrap().get_mut(&id) {
                m.score = score;
                m.count = count;
            }
        }
    }

    #[async_trait]
    impl MovieRepository for MockMovieRepository {
        async fn find_by_id(&self, id: i64) -> Result<Option<MovieRecord>, RepositoryError> {
            Ok(self.movies.lock().unwrap().get(&id).cloned())
        }

        async fn search_by_title(&self, title: &str, page: Pagination) -> Result<Page<MovieRecord>, RepositoryError> {
            let needle = title.trim().to_uppercase();
            let movies = self.movies.lock().unwrap();
            let matching: Vec<&MovieRecord> = movies.values().filter(|m| m.title.to_uppercase().contains(&needle)).collect();
            let total = matching.len() as u64;
            let (_, limit) = page.normalize();
            let items = matching
                .into_iter()
                .skip(page.offset() as usize)
                .take(limit as usize)
                .cloned()
                .collect();
            Ok(Page::new(items, page, total))
        }

        async fn insert(&self, input: MovieInput) -> Result<MovieRecord, RepositoryError> {
            let mut movies = self.movies.lock().unwrap();
            let id = movies.keys().next_back().copied().unwrap_or(0) + 1;
            let rec = MovieRecord { id, title: input.title, release_year: input.release_year, image: input.image, score: 0.0, count: 0 };
            movies.insert(id, rec.clone());
            Ok(rec)
        }

        async fn update_details(&self, id: i64, input: MovieInput) -> Result<MovieRecord, RepositoryError> {
            *self.update_calls.lock().unwrap() += 1;
            let mut movies = self.movies.lock().unwrap();
            let slot = movies.get_mut(&id).ok_or_else(|| RepositoryError::NotFound("movie".into()))?;
            input.apply_to(slot);
            Ok(slot.clone())
        }

        async fn get_reference_by_id(&self, id: i64) -> Result<MovieRecord, RepositoryError> {
            self.movies.lock().unwrap().get(&id).cloned().ok_or_else(|| RepositoryError::NotFound("movie".into()))
        }

        async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
            Ok(self.movies.lock().unwrap().contains_key(&id))
        }

        async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
            self.delete_calls.lock().unwrap().push(id);
            if self.dependent.lock().unwrap().contains(&id) {
                return Err(RepositoryError::Constraint("fk_score_movie".into()));
            }
            self.movies.lock().unwrap().remove(&id);
            Ok(())
        }
    }
}
