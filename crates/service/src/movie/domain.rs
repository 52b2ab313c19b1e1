use serde::{Deserialize, Serialize};

use models::errors::ModelError;

/// Persisted movie as returned by repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    pub release_year: Option<i32>,
    pub image: String,
    pub score: f64,
    pub count: i32,
}

impl From<models::movie::Model> for MovieRecord {
    fn from(m: models::movie::Model) -> Self {
        Self { id: m.id, title: m.title, release_year: m.release_year, image: m.image, score: m.score, count: m.count }
    }
}

/// Create/update payload. The aggregate is never taken from input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieInput {
    pub title: String,
    #[serde(default)]
    pub release_year: Option<i32>,
    pub image: String,
}

impl MovieInput {
    /// Check field rules and return the input with a trimmed title.
    pub fn validated(self) -> Result<Self, ModelError> {
        let title = models::movie::validate_title(&self.title)?;
        models::movie::validate_release_year(self.release_year)?;
        models::movie::validate_image(&self.image)?;
        Ok(Self { title, ..self })
    }

    /// Copy the editable fields onto an existing record.
    pub fn apply_to(self, record: &mut MovieRecord) {
        record.title = self.title;
        record.release_year = self.release_year;
        record.image = self.image;
    }
}

/// External view of a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDto {
    pub id: i64,
    pub title: String,
    pub score: f64,
    pub count: i32,
    pub image: String,
    pub release_year: Option<i32>,
}

impl From<MovieRecord> for MovieDto {
    fn from(r: MovieRecord) -> Self {
        Self { id: r.id, title: r.title, score: r.score, count: r.count, image: r.image, release_year: r.release_year }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_trims_title_and_keeps_fields() {
        let input = MovieInput { title: "  Venom: Tempo de Carnificina ".into(), release_year: Some(2021), image: "https://example.com/venom.jpg".into() };
        let v = input.validated().unwrap();
        assert_eq!(v.title, "Venom: Tempo de Carnificina");
        assert_eq!(v.release_year, Some(2021));
    }

    #[test]
    fn apply_leaves_aggregate_untouched() {
        let mut rec = MovieRecord { id: 7, title: "Old title".into(), release_year: None, image: "https://a/b.jpg".into(), score: 4.0, count: 3 };
        MovieInput { title: "New title".into(), release_year: Some(2001), image: "https://c/d.jpg".into() }.apply_to(&mut rec);
        assert_eq!(rec.title, "New title");
        assert_eq!(rec.score, 4.0);
        assert_eq!(rec.count, 3);
        assert_eq!(rec.id, 7);
    }
}
