pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::AppError;
