// src/core/config.rs
use std::env;

use log::LevelFilter;

// Runtime settings for the password security toolkit
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Password Generation
    pub default_password_length: usize,

    // Reporting
    pub weak_score_threshold: i64,

    // Logging
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/passguard.db".to_string(),
            default_password_length: 16,
            weak_score_threshold: 40,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    // Load configuration from environment variables
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(val) = env::var("DEFAULT_PASSWORD_LENGTH") {
            if let Ok(length) = val.parse() {
                config.default_password_length = length;
            }
        }

        if let Ok(val) = env::var("WEAK_SCORE_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.weak_score_threshold = threshold;
            }
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            match level.to_lowercase().as_str() {
                "error" => config.log_level = LevelFilter::Error,
                "warn" => config.log_level = LevelFilter::Warn,
                "info" => config.log_level = LevelFilter::Info,
                "debug" => config.log_level = LevelFilter::Debug,
                "trace" => config.log_level = LevelFilter::Trace,
                _ => {}
            }
        }

        config
    }
}
