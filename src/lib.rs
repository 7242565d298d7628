pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod generation;
pub mod mail;
pub mod models;
pub mod state;
pub mod whatsapp;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
