//! HTTP handlers for the flashcard service.

pub mod cards;
pub mod health;
pub mod metrics;
