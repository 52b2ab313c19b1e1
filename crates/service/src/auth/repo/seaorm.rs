use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};

use models::errors::ModelError;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    AuthUser { id: u.id, email: u.email, name: u.name, role: u.role }
}

fn to_auth_error(e: ModelError) -> AuthError {
    match e {
        ModelError::Validation(msg) => AuthError::Validation(msg),
        ModelError::Constraint(_) => AuthError::Conflict,
        ModelError::Db(msg) => AuthError::Repository(msg),
    }
}

fn to_credentials(c: models::user_credentials::Model) -> Credentials {
    Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(
        &self,
        email: &str,
        name: &str,
        role: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        let created = models::user::create(&txn, email, name, role).await.map_err(to_auth_error)?;
        models::user_credentials::upsert_password(&txn, created.id, password_hash, &password_algorithm)
            .await
            .map_err(to_auth_error)?;
        txn.commit().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: i64) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_credentials))
    }
}
