//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations
//! - Entity models and the reaction state machine

mod database;
mod models;

pub use database::Database;
pub use models::*;
