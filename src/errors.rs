// src/errors.rs

//! Crate-wide error type and helpers.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplewatchError {
    /// `is_same` / `regions` called on a sampler that never captured a baseline.
    #[error("sampler has no baseline (init was never called)")]
    NotInitialized,

    /// The resource could not be read (vanished, truncated, transient IO).
    #[error("Read failure: {0}")]
    ReadFailure(#[source] io::Error),

    /// Access to the resource was revoked; polling cannot succeed anymore.
    #[error("Permission denied: {0}")]
    PermissionDenied(#[source] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SamplewatchError {
    /// Classify an IO error raised while reading the watched resource.
    pub fn from_read(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => SamplewatchError::PermissionDenied(err),
            _ => SamplewatchError::ReadFailure(err),
        }
    }

    /// Whether this error should end a watch session instead of being retried.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SamplewatchError::PermissionDenied(_))
    }
}

pub type Result<T> = std::result::Result<T, SamplewatchError>;
