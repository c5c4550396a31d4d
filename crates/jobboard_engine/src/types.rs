use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Connection,
    TooManyRedirects,
    Timeout,
    HttpStatus(u16),
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Connection => write!(f, "connection error"),
            FailureKind::TooManyRedirects => write!(f, "too many redirects"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "could not decode json response"),
        }
    }
}

/// Failure of one source's processing. The coordinator recovers every
/// variant into "zero records from this source".
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("none of the expected fields were found in the {source_name} response")]
    SchemaMismatch { source_name: String },
    #[error("unknown source '{0}'")]
    UnknownSource(String),
    #[error("invalid configuration for {source_name}: {message}")]
    Configuration {
        source_name: String,
        message: String,
    },
    #[error("{source_name} did not finish within {after:?}")]
    DeadlineExceeded {
        source_name: String,
        after: Duration,
    },
    #[error("{source_name} task failed: {message}")]
    Task {
        source_name: String,
        message: String,
    },
}

impl SourceError {
    pub(crate) fn configuration(source_name: &str, message: impl fmt::Display) -> Self {
        SourceError::Configuration {
            source_name: source_name.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn schema_mismatch(source_name: &str) -> Self {
        SourceError::SchemaMismatch {
            source_name: source_name.to_string(),
        }
    }

    /// The fetch failure classification, when this error came from the network.
    pub fn failure_kind(&self) -> Option<&FailureKind> {
        match self {
            SourceError::Fetch(err) => Some(&err.kind),
            _ => None,
        }
    }
}
