// src/generators/mod.rs
pub mod password;

pub use password::{GenerationOptions, PasswordGenerator, SYMBOLS};
