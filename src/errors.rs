// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacherError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing dependency: {0}")]
    DependencyMissing(String),

    #[error("Failed to pull '{image}' after {attempts} attempts")]
    ExhaustedRetries { image: String, attempts: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CacherError {
    /// Process exit status for this error.
    ///
    /// The wrapper only distinguishes success from failure, so every variant
    /// maps to 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, CacherError>;
