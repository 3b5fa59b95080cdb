// src/lib.rs
pub mod analyzer;
pub mod cli;
pub mod core;
pub mod db;
pub mod generators;
pub mod models;
pub mod utils;

pub use crate::core::config::Config;
pub use crate::core::service::{SecurityService, ServiceError};
pub use crate::db::Database;
