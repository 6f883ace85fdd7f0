pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::AppState;
