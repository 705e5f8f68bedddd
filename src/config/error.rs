//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A size setting (batch size, sequence length) was not a positive integer.
    #[error("invalid {name} '{value}': must be a positive integer")]
    InvalidSize { name: &'static str, value: String },

    /// A boolean switch had a value other than true/false, 1/0, yes/no or on/off.
    #[error("invalid value '{value}' for {name}: expected true or false")]
    InvalidFlag { name: String, value: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Model directory is missing one of the files the loader needs.
    #[error("model directory {dir} is missing {file}")]
    MissingModelFile { dir: PathBuf, file: &'static str },
}
