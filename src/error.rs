use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
/// Errors surfaced by the federated read path.
pub enum QueryError {
    #[error("Backend {backend} unavailable. {reason}")]
    BackendUnavailable { backend: String, reason: String },

    #[error("All {failed} backends failed. {first}")]
    AllBackendsFailed {
        failed: usize,
        first: Box<QueryError>,
    },

    #[error("Query canceled")]
    Canceled,

    #[error("Query deadline exceeded")]
    DeadlineExceeded,

    #[error("Invalid regex. {0}")]
    InvalidRegex(String),

    #[error("Invalid matcher. {0}")]
    InvalidMatcher(String),

    #[error("Invalid configuration. {0}")]
    InvalidConfiguration(String),

    #[error("Error releasing querier. {0}")]
    Release(String),

    #[error("{0}")]
    General(String),
}

pub type QueryResult<T = ()> = Result<T, QueryError>;

impl QueryError {
    pub fn backend<N: Into<String>, R: ToString>(backend: N, reason: R) -> Self {
        QueryError::BackendUnavailable {
            backend: backend.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the underlying error when this wraps a fan-out failure.
    pub fn root(&self) -> &QueryError {
        match self {
            QueryError::AllBackendsFailed { first, .. } => first.root(),
            _ => self,
        }
    }

    pub fn is_context_error(&self) -> bool {
        matches!(self, QueryError::Canceled | QueryError::DeadlineExceeded)
    }
}

impl From<&str> for QueryError {
    fn from(s: &str) -> Self {
        QueryError::General(s.to_string())
    }
}

impl From<String> for QueryError {
    fn from(s: String) -> Self {
        QueryError::General(s)
    }
}

impl From<regex::Error> for QueryError {
    fn from(e: regex::Error) -> Self {
        QueryError::InvalidRegex(e.to_string())
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        QueryError::InvalidConfiguration(e.to_string())
    }
}
