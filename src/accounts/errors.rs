use std::fmt;

/// Failures where no interpretable reply came back from the Account Service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    Config(String),
    Network(String),
    Timeout(String),
    Http { status: u16, message: String },
    Parse(String),
    Serialization(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Config(message) => write!(formatter, "Config error: {message}"),
            TransportError::Network(message) => write!(formatter, "Network error: {message}"),
            TransportError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            TransportError::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            TransportError::Parse(message) => write!(formatter, "Response error: {message}"),
            TransportError::Serialization(message) => {
                write!(formatter, "Request error: {message}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Result of an Account Service call that did not succeed.
///
/// `Rejected` means the service processed the request and declined it; the
/// message is whatever the service supplied, if anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountError {
    Rejected(Option<String>),
    Transport(TransportError),
}

impl AccountError {
    /// Service message for a rejection, or `default` when it sent none.
    #[must_use]
    pub fn rejection_message(&self, default: &str) -> Option<String> {
        match self {
            AccountError::Rejected(Some(message)) if !message.trim().is_empty() => {
                Some(message.clone())
            }
            AccountError::Rejected(_) => Some(default.to_string()),
            AccountError::Transport(_) => None,
        }
    }
}

impl fmt::Display for AccountError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountError::Rejected(Some(message)) => write!(formatter, "Rejected: {message}"),
            AccountError::Rejected(None) => write!(formatter, "Rejected"),
            AccountError::Transport(err) => err.fmt(formatter),
        }
    }
}

impl std::error::Error for AccountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccountError::Transport(err) => Some(err),
            AccountError::Rejected(_) => None,
        }
    }
}

impl From<TransportError> for AccountError {
    fn from(err: TransportError) -> Self {
        AccountError::Transport(err)
    }
}
