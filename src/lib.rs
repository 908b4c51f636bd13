pub mod auth;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod ids;
pub mod models;
pub mod seed;
pub mod state;
pub mod storage;
pub mod stores;

pub use error::{AppError, Result};
