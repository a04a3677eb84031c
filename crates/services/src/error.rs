//! Shared error types for the services crate.

use thiserror::Error;

use showcase_core::model::ProjectError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the remote catalog and project endpoints.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Errors emitted by a token renewal attempt. Every variant is fatal for the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenewalError {
    #[error("renewal rejected with status {0}")]
    Rejected(reqwest::StatusCode),
    #[error("renewal request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("renewal response carried no usable access token")]
    MalformedResponse,
    #[error("invalid renewal endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Errors emitted by `SessionManager`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionManagerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProjectService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProjectServiceError {
    #[error("creating or editing projects requires a logged-in user")]
    NotLoggedIn,
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API base URL {raw:?}: {source}")]
    InvalidBaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{var} must be a positive number of seconds, got {raw:?}")]
    InvalidSeconds { var: &'static str, raw: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
