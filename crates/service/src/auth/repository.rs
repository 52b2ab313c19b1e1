use async_trait::async_trait;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError>;
    /// Insert the user and their credentials together; on error neither is stored.
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        role: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: i64) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: email
        creds: Mutex<HashMap<i64, Credentials>>, // key: user_id
        fail_next_credentials: AtomicBool,
    }

    impl MockAuthRepository {
        /// The next credentials insert fails, taking the user insert down with it.
        pub fn fail_next_credentials(&self) {
            self.fail_next_credentials.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn find_user_by_id(&self, id: i64) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn create_user(
            &self,
            email: &str,
            name: &str,
            role: &str,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(AuthError::Conflict);
            }
            if self.fail_next_credentials.swap(false, Ordering::SeqCst) {
                return Err(AuthError::Repository("credentials insert failed".into()));
            }
            let id = users.values().map(|u| u.id).max().unwrap_or(0) + 1;
            let user = AuthUser { id, email: email.to_string(), name: name.to_string(), role: role.to_string() };
            self.creds.lock().unwrap().insert(id, Credentials { user_id: id, password_hash, password_algorithm });
            users.insert(email.to_string(), user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: i64) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }
    }
}
