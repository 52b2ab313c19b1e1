use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A stored vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub movie_id: i64,
    pub user_id: i64,
    pub value: f64,
}

impl From<models::score::Model> for ScoreRecord {
    fn from(m: models::score::Model) -> Self {
        Self { movie_id: m.movie_id, user_id: m.user_id, value: m.value }
    }
}

/// Vote request from the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDto {
    pub movie_id: i64,
    pub score: f64,
}

/// A movie's scores keyed by user id, so a revote replaces the previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSet {
    by_user: BTreeMap<i64, f64>,
}

impl ScoreSet {
    pub fn from_records(records: impl IntoIterator<Item = ScoreRecord>) -> Self {
        Self { by_user: records.into_iter().map(|r| (r.user_id, r.value)).collect() }
    }

    /// Returns the value it replaced, if any.
    pub fn upsert(&mut self, user_id: i64, value: f64) -> Option<f64> {
        self.by_user.insert(user_id, value)
    }

    /// Mean of all values; 0.0 for an empty set.
    pub fn average(&self) -> f64 {
        if self.by_user.is_empty() {
            return 0.0;
        }
        self.by_user.values().sum::<f64>() / self.by_user.len() as f64
    }

    pub fn count(&self) -> i32 {
        self.by_user.len() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_has_zero_aggregate() {
        let set = ScoreSet::default();
        assert_eq!(set.average(), 0.0);
        assert_eq!(set.count(), 0);
    }

    #[test]
    fn upsert_replaces_same_user() {
        let mut set = ScoreSet::from_records([
            ScoreRecord { movie_id: 1, user_id: 1, value: 5.0 },
            ScoreRecord { movie_id: 1, user_id: 2, value: 3.0 },
        ]);
        assert_eq!(set.average(), 4.0);
        assert_eq!(set.upsert(2, 1.0), Some(3.0));
        assert_eq!(set.count(), 2);
        assert_eq!(set.average(), 3.0);
        assert_eq!(set.upsert(3, 0.0), None);
        assert_eq!(set.average(), 2.0);
    }
}
