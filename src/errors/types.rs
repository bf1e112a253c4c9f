use thiserror::Error;

#[derive(Debug, Error)]
pub enum MollyError {
    #[error("a session named '{0}' already exists")]
    DuplicateSession(String),

    #[error("scanner failed: {0}")]
    ScannerFailure(String),

    #[error("scan output could not be fully parsed: {0}")]
    ParseDegraded(String),

    #[error("CVE lookup unavailable: {0}")]
    CveLookupUnavailable(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("persistence error: {0}")]
    PersistenceError(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for MollyError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            if e.code == rusqlite::ErrorCode::ConstraintViolation {
                return MollyError::DuplicateSession(err.to_string());
            }
        }
        MollyError::PersistenceError(err.to_string())
    }
}
