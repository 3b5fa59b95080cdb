// src/utils/mod.rs
mod format;
mod spinner;

pub use format::*;
pub use spinner::Spinner;
