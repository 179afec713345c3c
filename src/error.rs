use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the catalog.
pub(crate) type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database not found: {}", path.display())]
    DatabaseMissing { path: PathBuf },

    #[error("No record with id {0}")]
    RecordNotFound(i64),

    #[error("No category with id {0}")]
    CategoryNotFound(i64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend request failed: {0}")]
    BackendTransport(String),

    #[error("Backend returned {status} {status_text}")]
    BackendStatus { status: u16, status_text: String },

    #[error("Backend response could not be decoded: {0}")]
    BackendDecode(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored date {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },
}

impl From<ureq::Error> for CatalogError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, resp) => Self::BackendStatus {
                status,
                status_text: resp.status_text().to_string(),
            },
            ureq::Error::Transport(transport) => Self::BackendTransport(transport.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_status_message_includes_code_and_text() {
        let err = CatalogError::BackendStatus {
            status: 502,
            status_text: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 502 Bad Gateway");
    }

    #[test]
    fn missing_database_message_shows_path() {
        let err = CatalogError::DatabaseMissing {
            path: PathBuf::from("/tmp/none.sqlite"),
        };
        assert_eq!(err.to_string(), "Database not found: /tmp/none.sqlite");
    }
}
