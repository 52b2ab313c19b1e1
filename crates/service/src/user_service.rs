//! "Who is calling?" for services that act on behalf of a user.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::auth::domain::{AuthUser, Claims};
use crate::auth::repository::AuthRepository;
use crate::errors::ServiceError;

/// Supplies the user the current operation runs as.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn authenticated(&self) -> Result<AuthUser, ServiceError>;
}

/// Resolves verified token claims to a stored user.
pub struct TokenUserService<R: AuthRepository> {
    repo: Arc<R>,
    claims: Option<Claims>,
}

impl<R: AuthRepository> TokenUserService<R> {
    pub fn new(repo: Arc<R>, claims: Option<Claims>) -> Self { Self { repo, claims } }
}

#[async_trait]
impl<R: AuthRepository> UserService for TokenUserService<R> {
    async fn authenticated(&self) -> Result<AuthUser, ServiceError> {
        let claims = self
            .claims
            .as_ref()
            .ok_or_else(|| ServiceError::Unauthorized("authentication required".into()))?;
        match self.repo.find_user_by_id(claims.uid).await? {
            // a token outliving its account, or re-issued for another address, is rejected
            Some(user) if user.email == claims.sub => Ok(user),
            _ => {
                debug!(uid = claims.uid, "token refers to unknown user");
                Err(ServiceError::Unauthorized("unknown user".into()))
            }
        }
    }
}

/// Fixed-identity implementations for tests and benches
pub mod mock {
    use super::*;

    pub struct FixedUserService(pub Option<AuthUser>);

    impl FixedUserService {
        pub fn client(id: i64, email: &str) -> Self {
            Self(Some(AuthUser { id, email: email.into(), name: "Client".into(), role: models::user::ROLE_CLIENT.into() }))
        }

        pub fn anonymous() -> Self { Self(None) }
    }

    #[async_trait]
    impl UserService for FixedUserService {
        async fn authenticated(&self) -> Result<AuthUser, ServiceError> {
            self.0.clone().ok_or_else(|| ServiceError::Unauthorized("authentication required".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn claims_for(user: &AuthUser) -> Claims {
        Claims { sub: user.email.clone(), uid: user.id, role: user.role.clone(), exp: usize::MAX, iat: 0 }
    }

    #[tokio::test]
    async fn resolves_claims_to_stored_user() {
        let repo = Arc::new(MockAuthRepository::default());
        let user = repo
            .create_user("alex@gmail.com", "Alex", models::user::ROLE_CLIENT, "hash".into(), "argon2".into())
            .await
            .unwrap();
        let svc = TokenUserService::new(repo, Some(claims_for(&user)));
        assert_eq!(svc.authenticated().await.unwrap(), user);
    }

    #[tokio::test]
    async fn missing_claims_or_unknown_user_is_unauthorized() {
        let repo = Arc::new(MockAuthRepository::default());
        let anon = TokenUserService::new(repo.clone(), None);
        assert!(matches!(anon.authenticated().await, Err(ServiceError::Unauthorized(_))));

        let ghost = AuthUser { id: 99, email: "ghost@gmail.com".into(), name: "Ghost".into(), role: models::user::ROLE_CLIENT.into() };
        let svc = TokenUserService::new(repo, Some(claims_for(&ghost)));
        assert!(matches!(svc.authenticated().await, Err(ServiceError::Unauthorized(_))));
    }
}
