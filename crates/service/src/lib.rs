//! Service layer for the movie catalogue and user scores.
//! - Repository traits separate business rules from data access.
//! - Each repository has a SeaORM implementation and an in-memory `mock` one.
//! - Reuses validation and entity definitions in `models` crate.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod user_service;
pub mod movie;
pub mod score;
#[cfg(test)]
pub mod test_support;
