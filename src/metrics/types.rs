use std::fmt;
use std::time::Duration;

/// Fixed failure taxonomy. The label doubles as the error-tally key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response (or body) within the configured request timeout.
    Timeout,
    /// Transport failure establishing or maintaining the connection.
    ConnectionError,
    /// The server answered with a non-success status.
    HttpError { status: u16 },
    /// Request-level failure reported by the HTTP client.
    ClientError,
    /// A manifest was downloaded but could not be turned into segments.
    ManifestParseError,
    UnexpectedError,
}

impl ErrorKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "Timeout",
            ErrorKind::ConnectionError => "ConnectionError",
            ErrorKind::HttpError { .. } => "HttpError",
            ErrorKind::ClientError => "ClientError",
            ErrorKind::ManifestParseError => "ManifestParseError",
            ErrorKind::UnexpectedError => "UnexpectedError",
        }
    }
}

/// A classified failure. Its description always starts with `label:` so the
/// prefix before the first colon is the tally key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl RequestError {
    #[must_use]
    pub const fn new(kind: ErrorKind, detail: String) -> Self {
        Self { kind, detail }
    }

    /// Tally key: the description up to the first colon.
    #[must_use]
    pub const fn tally_key(&self) -> &'static str {
        self.kind.label()
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "{}", self.kind.label())
        } else {
            write!(f, "{}: {}", self.kind.label(), self.detail)
        }
    }
}

/// Result of a single attempt. Folded into the aggregator and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub latency: Duration,
    pub error: Option<RequestError>,
}

impl RequestOutcome {
    #[must_use]
    pub const fn success(latency: Duration) -> Self {
        Self {
            latency,
            error: None,
        }
    }

    #[must_use]
    pub const fn failure(latency: Duration, error: RequestError) -> Self {
        Self {
            latency,
            error: Some(error),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
