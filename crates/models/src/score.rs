use sea_orm::{entity::prelude::*, sea_query::OnConflict, ConnectionTrait, Set, QueryFilter, QueryOrder};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, movie, user};

pub const MIN_VALUE: f64 = 0.0;
pub const MAX_VALUE: f64 = 5.0;

/// One user's score for one movie.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "score")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub movie_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    #[sea_orm(column_type = "Double")]
    pub value: f64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Movie, User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Movie => Entity::belongs_to(movie::Entity)
                .from(Column::MovieId)
                .to(movie::Column::Id)
                .into(),
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<movie::Entity> for Entity {
    fn to() -> RelationDef { Relation::Movie.def() }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_value(value: f64) -> Result<(), errors::ModelError> {
    if !value.is_finite() || !(MIN_VALUE..=MAX_VALUE).contains(&value) {
        return Err(errors::ModelError::Validation(format!("score must be within {MIN_VALUE}..={MAX_VALUE}")));
    }
    Ok(())
}

/// Insert or overwrite the (movie, user) score in one statement.
pub async fn upsert<C: ConnectionTrait>(db: &C, movie_id: i64, user_id: i64, value: f64) -> Result<Model, errors::ModelError> {
    validate_value(value)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        movie_id: Set(movie_id),
        user_id: Set(user_id),
        value: Set(value),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let saved = Entity::insert(am)
        .on_conflict(
            OnConflict::columns([Column::MovieId, Column::UserId])
                .update_columns([Column::Value, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_with_returning(db)
        .await?;
    Ok(saved)
}

pub async fn list_by_movie<C: ConnectionTrait>(db: &C, movie_id: i64) -> Result<Vec<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::MovieId.eq(movie_id))
        .order_by_asc(Column::UserId)
        .all(db)
        .await?)
}
