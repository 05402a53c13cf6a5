//! Error types for the classification core and its recognizer seam.

/// Errors raised by the classifier and its configuration layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    /// A prediction carried a probability outside `[0, 1]` (or NaN/inf).
    #[error("invalid input: prediction #{index} ('{label}') has probability {probability}, expected 0..=1")]
    InvalidInput {
        index: usize,
        label: String,
        probability: f64,
    },

    /// A tunable parameter violates its constraint.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// No recognizer is configured, or loading it failed.
    #[error("recognizer unavailable: {0}")]
    RecognizerUnavailable(String),

    /// The recognizer loaded but could not score the image.
    #[error("recognizer failed: {0}")]
    RecognizerFailed(String),
}

impl ClassifyError {
    /// Short machine-readable code, used by the HTTP layer and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            ClassifyError::InvalidInput { .. } => "invalid_input",
            ClassifyError::InvalidConfig(_) => "invalid_config",
            ClassifyError::RecognizerUnavailable(_) => "recognizer_unavailable",
            ClassifyError::RecognizerFailed(_) => "recognizer_failed",
        }
    }
}
