use sea_orm::{entity::prelude::*, ConnectionTrait, DatabaseConnection, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, movie, score};

pub const ROLE_CLIENT: &str = "ROLE_CLIENT";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Score,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Score => Entity::has_many(score::Entity).into() }
    }
}

impl Related<score::Entity> for Entity {
    fn to() -> RelationDef { Relation::Score.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if !email.contains('@') || email.len() > 255 { return Err(errors::ModelError::Validation("invalid email".into())); }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    if name.len() > 128 { return Err(errors::ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

pub fn validate_role(role: &str) -> Result<(), errors::ModelError> {
    if role != ROLE_CLIENT && role != ROLE_ADMIN {
        return Err(errors::ModelError::Validation(format!("unknown role {role}")));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, email: &str, name: &str, role: &str) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    validate_role(role)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        role: Set(role.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

/// Delete a user and their scores, recomputing the aggregate of every movie they voted on.
pub async fn hard_delete(db: &DatabaseConnection, id: i64) -> Result<(), errors::ModelError> {
    let txn = db.begin().await?;
    let voted: Vec<i64> = score::Entity::find()
        .filter(score::Column::UserId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| s.movie_id)
        .collect();
    if !voted.is_empty() {
        // lock in id order, same as single-movie votes
        movie::Entity::find()
            .filter(movie::Column::Id.is_in(voted.clone()))
            .order_by_asc(movie::Column::Id)
            .lock_exclusive()
            .all(&txn)
            .await?;
        score::Entity::delete_many().filter(score::Column::UserId.eq(id)).exec(&txn).await?;
        for movie_id in voted {
            movie::refresh_aggregate(&txn, movie_id).await?;
        }
    }
    Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_at_sign() {
        assert!(validate_email("alex@gmail.com").is_ok());
        assert!(validate_email("alex.gmail.com").is_err());
    }

    #[test]
    fn only_known_roles() {
        assert!(validate_role(ROLE_ADMIN).is_ok());
        assert!(validate_role(ROLE_CLIENT).is_ok());
        assert!(validate_role("ROLE_OPERATOR").is_err());
    }

    #[test]
    fn blank_name_rejected() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Maria").is_ok());
    }
}
