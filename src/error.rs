//! Error types for nodewatch queries, backend clients and setup.

use thiserror::Error;

/// Failures reported by a backend cluster client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("authentication failed: {0}")]
    Unauthorized(String),

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("request timeout: {0}")]
    Timeout(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("client error: {0}")]
    Other(String),
}

/// A returned entry carried a field that could not be decomposed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {field} {value:?}: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

/// Errors surfaced by a dependency query.
#[derive(Debug, Error)]
pub enum DependencyError {
    /// The selector string did not match the grammar of the query kind.
    #[error("{kind}: invalid format: {input:?}")]
    InvalidSelector { kind: &'static str, input: String },

    /// The query was stopped; callers must stop polling it.
    #[error("dependency stopped")]
    Stopped,

    #[error("{query}: {source}")]
    Backend {
        query: String,
        #[source]
        source: ClientError,
    },

    #[error("{query}: {source}")]
    MalformedField {
        query: String,
        #[source]
        source: FieldError,
    },
}

impl DependencyError {
    /// Backend-class failures: the backend call failed or returned an entry
    /// that could not be normalized.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            DependencyError::Backend { .. } | DependencyError::MalformedField { .. }
        )
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, DependencyError::Stopped)
    }

    /// The wrapped client error, if the failure came from the backend call.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            DependencyError::Backend { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Snapshot encoding errors.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("no encoding registered for dependency type {0}")]
    Unregistered(&'static str),

    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode codec error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Configuration and process setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Errors surfaced by a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to render output: {0}")]
    Output(String),
}
