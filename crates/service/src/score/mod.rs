//! Scoring: one value per (movie, user), with the movie aggregate kept in step.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::ScoreService;
