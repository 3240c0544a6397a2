//! Error types for the persisted state and the inference server

use std::path::PathBuf;

/// On-disk state could not be read or written
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Could not read `{}`: {source}", .path.to_string_lossy())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write `{}`: {source}", .path.to_string_lossy())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed data in `{}`: {source}", .path.to_string_lossy())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Could not serialize state: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// A settings command was rejected
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Command used before the guild has any settings, e.g. `/setmodel` before `/seturl`
    #[error("No server settings exist yet")]
    NotConfigured,
    #[error("Model `{model}` is not available")]
    UnknownModel { model: String, available: Vec<String> },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A call to the inference server failed
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Request to `{url}` failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("`{url}` responded with {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Could not decode response from `{url}`: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
