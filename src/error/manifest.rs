use thiserror::Error;

/// Failures scoped to the worker that requested a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to fetch manifest '{url}': {reason}")]
    Fetch { url: String, reason: String },
    #[error("Failed to parse manifest XML: {source}")]
    Xml {
        #[source]
        source: roxmltree::Error,
    },
    #[error("Manifest root must be <MPD> in namespace '{expected}', found <{found}>.")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },
    #[error("Invalid {attribute} '{value}' in manifest: {source}")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Representation '{representation}' expands to more than {limit} segments.")]
    TimelineTooLong {
        representation: String,
        limit: u64,
    },
    #[error("Failed to resolve segment URL '{url}': {source}")]
    SegmentUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ManifestError {
    /// Error-tally label for the failed manifest attempt.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            ManifestError::Fetch { .. } => "ManifestFetchError",
            ManifestError::Xml { .. }
            | ManifestError::UnexpectedRoot { .. }
            | ManifestError::InvalidNumber { .. }
            | ManifestError::TimelineTooLong { .. }
            | ManifestError::SegmentUrl { .. } => "ManifestParseError",
        }
    }
}
