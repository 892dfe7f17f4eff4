//! Core error types for medprompts-core.
//!
//! Engine operations never fail: corrupt state falls back to defaults and
//! save failures are logged. These types cover the fallible edges instead:
//! opening storage, loading configuration and the access gate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("storage: {0}")]
    Database(#[from] DatabaseError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("Access denied: {0}")]
    Auth(#[from] AuthError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// Failures of the SQLite document store.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("cannot open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("statement failed: {0}")]
    QueryFailed(String),

    #[error("schema setup failed: {0}")]
    MigrationFailed(String),

    /// Another process held the write lock past the busy timeout.
    #[error("database busy, another process is writing")]
    Locked,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("data directory {path} unavailable: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("bad value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("unreadable config: {0}")]
    ParseFailed(String),
}

/// Access gate errors, mirrored onto the HTTP status the backend answers with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    /// Rejected or expired.
    #[error("invalid or expired token: {0}")]
    InvalidToken(String),

    /// The validator failed for reasons unrelated to the token.
    #[error("token validation failed: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingToken => 401,
            AuthError::InvalidToken(_) => 403,
            AuthError::Internal(_) => 500,
        }
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        let busy = matches!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
        );
        if busy {
            DatabaseError::Locked
        } else {
            DatabaseError::QueryFailed(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_http_status() {
        assert_eq!(AuthError::MissingToken.status_code(), 401);
        assert_eq!(AuthError::InvalidToken("expired".into()).status_code(), 403);
        assert_eq!(AuthError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn auth_error_converts_into_core_error() {
        let err: CoreError = AuthError::MissingToken.into();
        assert!(matches!(err, CoreError::Auth(AuthError::MissingToken)));
        assert_eq!(err.to_string(), "Access denied: missing bearer token");
    }
}
