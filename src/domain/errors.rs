use std::fmt;
use thiserror::Error;

/// Pre-flight failure: the settings cannot produce a well-formed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Base URL is not configured. Use --set-url <URL> to set it.")]
    MissingBaseUrl,
    #[error("Base URL '{0}' must start with http:// or https://")]
    InvalidBaseUrl(String),
    #[error("No path available. Use --path <PATH> to add one.")]
    MissingPath,
    #[error("Unsupported HTTP method: '{0}'")]
    InvalidMethod(String),
    #[error("Basic auth requires a username. Use --set-username <NAME> to set it.")]
    MissingUsername,
    #[error("{0} auth requires a token. Use --set-token <TOKEN> to set it.")]
    MissingToken(String),
    #[error("Max time must be a positive number of seconds, got {0}")]
    InvalidMaxTime(i64),
    #[error("{0}")]
    InvalidEdit(String),
}

/// Classification of a failed request execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Timeout,
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unexpected => "unexpected",
        };
        f.write_str(label)
    }
}

/// A request that never produced a response.
///
/// Non-2xx responses are not errors; they travel as a normal `Response`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct ExecutionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ExecutionError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Transport, message: message.into() }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Timeout, message: message.into() }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Unexpected, message: message.into() }
    }
}

/// Failure reported by an `HttpClient` transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("HTTP exchange failed: {0}")]
    Protocol(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<TransportError> for ExecutionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect(_) | TransportError::Protocol(_) => {
                ExecutionError::transport(err.to_string())
            }
            TransportError::InvalidRequest(_) => ExecutionError::unexpected(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_classified() {
        let err: ExecutionError = TransportError::Connect("refused".into()).into();
        assert_eq!(err.kind, ErrorKind::Transport);
        assert!(err.message.contains("refused"));

        let err: ExecutionError = TransportError::Protocol("connection reset".into()).into();
        assert_eq!(err.kind, ErrorKind::Transport);

        let err: ExecutionError = TransportError::InvalidRequest("no host".into()).into();
        assert_eq!(err.kind, ErrorKind::Unexpected);
    }

    #[test]
    fn username_error_mentions_username() {
        assert!(ConfigError::MissingUsername.to_string().contains("username"));
        assert!(ConfigError::MissingBaseUrl.to_string().contains("Base URL"));
    }
}
