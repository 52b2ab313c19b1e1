use thiserror::Error;

use models::errors::ModelError;

/// Domain errors returned by services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::Conflict(_) => 1002,
            ServiceError::NotFound(_) => 1003,
            ServiceError::Unauthorized(_) => 1004,
            ServiceError::Forbidden(_) => 1005,
            ServiceError::Db(_) => 1200,
            ServiceError::Internal(_) => 1300,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => ServiceError::Validation(msg),
            ModelError::Constraint(msg) => ServiceError::Conflict(msg),
            ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

/// Signals raised by repositories; services translate them at their boundary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),
    /// A write was refused by a unique or referential constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("invalid record: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<ModelError> for RepositoryError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => RepositoryError::Invalid(msg),
            ModelError::Constraint(msg) => RepositoryError::Constraint(msg),
            ModelError::Db(msg) => RepositoryError::Db(msg),
        }
    }
}

impl From<sea_orm::DbErr> for RepositoryError {
    fn from(e: sea_orm::DbErr) -> Self {
        RepositoryError::from(ModelError::from(e))
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(entity) => ServiceError::not_found(&entity),
            RepositoryError::Constraint(msg) => ServiceError::Conflict(msg),
            RepositoryError::Invalid(msg) => ServiceError::Validation(msg),
            RepositoryError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_signals_translate_to_domain_errors() {
        let nf: ServiceError = RepositoryError::NotFound("movie".into()).into();
        assert!(matches!(nf, ServiceError::NotFound(ref m) if m == "movie not found"));
        let c: ServiceError = RepositoryError::Constraint("fk_score_movie".into()).into();
        assert_eq!(c.code(), 1002);
        let db: ServiceError = RepositoryError::Db("timeout".into()).into();
        assert!(matches!(db, ServiceError::Db(_)));
    }

    #[test]
    fn model_validation_stays_validation() {
        let e: ServiceError = ModelError::Validation("title".into()).into();
        assert_eq!(e.code(), 1001);
    }
}
