use thiserror::Error;

/// Failure of a single backend attempt.
///
/// The variants distinguish "backend unreachable" from "backend returned
/// garbage" so logs can tell them apart, but the retry policy treats every
/// variant the same: a generative backend occasionally emits malformed
/// output, and the retry loop is expected to smooth over both.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("response is not a valid finding: {0}")]
    Finding(#[from] serde_json::Error),
}

/// All attempts for one segment failed. Carries the attempt count and the
/// final attempt's cause so callers can log something useful.
#[derive(Debug, Error)]
#[error("backend analysis failed after {attempts} attempt(s): {cause}")]
pub struct BackendError {
    pub attempts: u32,
    #[source]
    pub cause: AttemptError,
}

/// Errors surfaced by the document analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing or empty required input. Never retried.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The backend failed on every attempt for some segment. The pipeline
    /// aborts and nothing is cached.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
