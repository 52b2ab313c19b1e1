use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument, warn};

use models::user::ROLE_ADMIN;

use super::domain::{default_role, AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub password_algorithm: String,
    pub token_ttl_hours: i64,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_hours: i64) -> Self {
        Self { jwt_secret: jwt_secret.into(), password_algorithm: "argon2".into(), token_ttl_hours }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new client account with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret", 12));
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// assert_eq!(user.role, "ROLE_CLIENT");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        self.create_account(input, default_role()).await
    }

    /// Authenticate a user and issue a signed token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret", 12));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&input.email);
        let user = self.repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let (token, expires_at) = self.issue_token(&user)?;
        info!(user_id = user.id, "user_logged_in");
        Ok(AuthSession { user, token, expires_at })
    }

    /// Sign a token for `user`; returns it with its expiry in unix seconds.
    pub fn issue_token(&self, user: &AuthUser) -> Result<(String, i64), AuthError> {
        let now = chrono::Utc::now();
        let expires_at = (now + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp();
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id,
            role: user.role.clone(),
            exp: expires_at as usize,
            iat: now.timestamp() as usize,
        };
        let token = encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok((token, expires_at))
    }

    /// Check signature and expiry of a bearer token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes()), &Validation::default())
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        Ok(data.claims)
    }

    /// Create the configured administrator unless the e-mail is already taken.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, name: &str, password: &str) -> Result<AuthUser, AuthError> {
        if let Some(existing) = self.repo.find_user_by_email(&normalize_email(email)).await? {
            if !existing.is_admin() {
                warn!(user_id = existing.id, "configured admin e-mail belongs to a non-admin account");
            }
            debug!(user_id = existing.id, "admin account already present");
            return Ok(existing);
        }
        let input = RegisterInput { email: email.to_string(), name: name.to_string(), password: password.to_string() };
        self.create_account(input, ROLE_ADMIN).await
    }

    async fn create_account(&self, input: RegisterInput, role: &str) -> Result<AuthUser, AuthError> {
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        let email = normalize_email(&input.email);
        models::user::validate_email(&email).map_err(|e| AuthError::Validation(e.to_string()))?;
        models::user::validate_name(&input.name).map_err(|e| AuthError::Validation(e.to_string()))?;
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user(&email, input.name.trim(), role, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(user)
    }
}

fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
