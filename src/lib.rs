pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod queries;
pub mod routes;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use app::AppState;
pub use config::AppConfig;
pub use error::{AppError, Result};
