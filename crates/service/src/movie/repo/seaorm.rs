use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use models::movie;

use crate::errors::RepositoryError;
use crate::movie::domain::{MovieInput, MovieRecord};
use crate::movie::repository::MovieRepository;
use crate::pagination::{Page, Pagination};

pub struct SeaOrmMovieRepository {
    pub db: DatabaseConnection,
}

/// `%FILTER%` with LIKE metacharacters backslash-escaped, so the filter matches literally.
fn contains_pattern(filter: &str) -> String {
    let mut pattern = String::with_capacity(filter.len() + 2);
    pattern.push('%');
    for c in filter.trim().to_uppercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait::async_trait]
impl MovieRepository for SeaOrmMovieRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<MovieRecord>, RepositoryError> {
        let found = movie::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(MovieRecord::from))
    }

    async fn search_by_title(&self, title: &str, page: Pagination) -> Result<Page<MovieRecord>, RepositoryError> {
        let (idx, per_page) = page.normalize();
        let pattern = LikeExpr::new(contains_pattern(title)).escape('\\');
        let paginator = movie::Entity::find()
            .filter(Expr::expr(Func::upper(Expr::col(movie::Column::Title))).like(pattern))
            .order_by_asc(movie::Column::Id)
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(idx).await?;
        Ok(Page::new(items.into_iter().map(MovieRecord::from).collect(), page, total))
    }

    async fn insert(&self, input: MovieInput) -> Result<MovieRecord, RepositoryError> {
        let created = movie::create(&self.db, &input.title, input.release_year, &input.image).await?;
        Ok(created.into())
    }

    async fn update_details(&self, id: i64, input: MovieInput) -> Result<MovieRecord, RepositoryError> {
        movie::update_details(&self.db, id, &input.title, input.release_year, &input.image)
            .await?
            .map(MovieRecord::from)
            .ok_or_else(|| RepositoryError::NotFound("movie".into()))
    }

    async fn get_reference_by_id(&self, id: i64) -> Result<MovieRecord, RepositoryError> {
        self.find_by_id(id).await?.ok_or_else(|| RepositoryError::NotFound("movie".into()))
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        let n = movie::Entity::find_by_id(id).count(&self.db).await?;
        Ok(n > 0)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        movie::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
