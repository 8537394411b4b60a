//! Error taxonomy for configuration, fetching, evaluation and notification.
//!
//! Only [`ConfigError`] ends a run. The others are recovered at the listing
//! or product level by the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading products, settings or credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{0} environment variable is required")]
    MissingCredential(&'static str),

    #[error("No products matching '{0}' found in configuration.")]
    NoMatchingProducts(String),

    #[error("Invalid setting: {0}")]
    InvalidSettings(String),
}

/// A page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("{status} error for url: {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("failed to read response body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl NetworkError {
    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The relevance model failed or answered with something unusable.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("empty response from model")]
    EmptyResponse,

    #[error("{0}")]
    Parse(#[from] serde_json::Error),
}

/// The digest email could not be delivered.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("{status} - {body}")]
    Api { status: u16, body: String },
}
