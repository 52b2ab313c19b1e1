use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, score};

pub const TITLE_MIN_LEN: usize = 5;
pub const TITLE_MAX_LEN: usize = 80;
pub const FIRST_RELEASE_YEAR: i32 = 1888;
pub const LAST_RELEASE_YEAR: i32 = 2100;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub release_year: Option<i32>,
    pub image: String,
    /// Mean of all `score.value` rows for this movie.
    #[sea_orm(column_type = "Double")]
    pub score: f64,
    pub count: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Score }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Score => Entity::has_many(score::Entity).into(),
        }
    }
}

impl Related<score::Entity> for Entity {
    fn to() -> RelationDef { Relation::Score.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Returns the trimmed title.
pub fn validate_title(title: &str) -> Result<String, errors::ModelError> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
        return Err(errors::ModelError::Validation(format!(
            "title must have between {TITLE_MIN_LEN} and {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_image(image: &str) -> Result<(), errors::ModelError> {
    if !(image.starts_with("http://") || image.starts_with("https://")) {
        return Err(errors::ModelError::Validation("image must be an http(s) URL".into()));
    }
    if image.len() > 512 {
        return Err(errors::ModelError::Validation("image URL too long (<=512)".into()));
    }
    Ok(())
}

pub fn validate_release_year(year: Option<i32>) -> Result<(), errors::ModelError> {
    match year {
        Some(y) if !(FIRST_RELEASE_YEAR..=LAST_RELEASE_YEAR).contains(&y) => Err(errors::ModelError::Validation(
            format!("release_year must be within {FIRST_RELEASE_YEAR}..={LAST_RELEASE_YEAR}"),
        )),
        _ => Ok(()),
    }
}

/// Insert a movie with an empty aggregate.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    title: &str,
    release_year: Option<i32>,
    image: &str,
) -> Result<Model, errors::ModelError> {
    let title = validate_title(title)?;
    validate_release_year(release_year)?;
    validate_image(image)?;

    let now = Utc::now().into();
    let am = ActiveModel {
        title: Set(title),
        release_year: Set(release_year),
        image: Set(image.to_string()),
        score: Set(0.0),
        count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

/// Overwrite the editable fields of a movie. `score` and `count` stay `NotSet`,
/// so a vote committed concurrently is never rolled back by an edit.
/// Returns `None` when no row has the id.
pub async fn update_details<C: ConnectionTrait>(
    db: &C,
    id: i64,
    title: &str,
    release_year: Option<i32>,
    image: &str,
) -> Result<Option<Model>, errors::ModelError> {
    let title = validate_title(title)?;
    validate_release_year(release_year)?;
    validate_image(image)?;

    let am = ActiveModel {
        id: Set(id),
        title: Set(title),
        release_year: Set(release_year),
        image: Set(image.to_string()),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };
    match am.update(db).await {
        Ok(m) => Ok(Some(m)),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write `score`/`count` only. Callers hold the row lock of the surrounding transaction.
pub async fn write_aggregate<C: ConnectionTrait>(
    db: &C,
    id: i64,
    score: f64,
    count: i32,
) -> Result<Option<Model>, errors::ModelError> {
    let am = ActiveModel {
        id: Set(id),
        score: Set(score),
        count: Set(count),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };
    match am.update(db).await {
        Ok(m) => Ok(Some(m)),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Recompute the aggregate from the stored score rows.
pub async fn refresh_aggregate<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Model>, errors::ModelError> {
    let values: Vec<f64> = score::list_by_movie(db, id).await?.into_iter().map(|s| s.value).collect();
    let (mean, count) = mean_and_count(&values);
    write_aggregate(db, id, mean, count).await
}

/// Mean of `values` (0.0 when empty) and their number.
pub fn mean_and_count(values: &[f64]) -> (f64, i32) {
    if values.is_empty() {
        return (0.0, 0);
    }
    (values.iter().sum::<f64>() / values.len() as f64, values.len() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed_and_bounded() {
        assert_eq!(validate_title("  The Witcher  ").unwrap(), "The Witcher");
        assert!(validate_title("Up").is_err());
        assert!(validate_title(&"x".repeat(81)).is_err());
        assert!(validate_title(&"x".repeat(80)).is_ok());
    }

    #[test]
    fn image_requires_http_scheme() {
        assert!(validate_image("https://image.tmdb.org/t/p/w533_and_h300_bestv2/jBJWaqoSCiARWtfV0GlqHrcdidd.jpg").is_ok());
        assert!(validate_image("ftp://example.com/a.jpg").is_err());
        assert!(validate_image("").is_err());
    }

    #[test]
    fn release_year_optional_but_bounded() {
        assert!(validate_release_year(None).is_ok());
        assert!(validate_release_year(Some(1999)).is_ok());
        assert!(validate_release_year(Some(1700)).is_err());
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean_and_count(&[]), (0.0, 0));
        assert_eq!(mean_and_count(&[5.0, 4.0, 0.0]), (3.0, 3));
    }
}
