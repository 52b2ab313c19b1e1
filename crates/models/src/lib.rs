//! SeaORM entities for the movie catalogue plus the field rules enforced before writes.

pub mod errors;
pub mod db;
pub mod user;
pub mod user_credentials;
pub mod movie;
pub mod score;

#[cfg(test)]
mod tests;
