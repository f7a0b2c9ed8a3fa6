// Error types for the tone recognition pipeline
//
// Two layers of failure exist and must never be confused:
// - ModelLoadError: startup-time artifact problems. A missing tone model is fatal;
//   missing pre-filter artifacts only disable the optional gating stage.
// - StageError: numerical/internal failures inside a pipeline stage. These are
//   caught at the stage boundary, logged, and downgraded to a negative
//   classification signal; they never abort a recognition run.

use thiserror::Error;

/// Errors raised while loading model artifacts at startup
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// The tone classifier could not be loaded. Fatal: the pipeline cannot operate.
    #[error("failed to load tone model from {path}: {source}")]
    ToneModel {
        path: String,
        #[source]
        source: ort::Error,
    },

    /// The feature scaler artifact could not be read or parsed
    #[error("failed to load feature scaler from {path}: {reason}")]
    PreFilterScaler { path: String, reason: String },

    /// The one-class boundary model artifact could not be read or parsed
    #[error("failed to load one-class model from {path}: {reason}")]
    PreFilterModel { path: String, reason: String },

    /// Scaler, support vectors, and the feature contract disagree on dimensions
    #[error("pre-filter artifact shape mismatch: {details}")]
    PreFilterShape { details: String },
}

impl ModelLoadError {
    /// Whether this failure only disables the optional pre-filter stage
    pub fn is_pre_filter(&self) -> bool {
        !matches!(self, ModelLoadError::ToneModel { .. })
    }
}

/// Recoverable failures inside a single pipeline stage
#[derive(Debug, Error)]
pub enum StageError {
    /// Feature extraction produced degenerate or non-finite values
    #[error("feature extraction failed: {0}")]
    FeatureExtraction(String),

    /// The pre-filter decision function could not be evaluated
    #[error("pre-filter evaluation failed: {0}")]
    PreFilter(String),

    /// Tone model inference failed or produced an unusable activation vector
    #[error("tone inference failed: {0}")]
    ToneInference(String),
}

impl From<ort::Error> for StageError {
    fn from(err: ort::Error) -> Self {
        StageError::ToneInference(err.to_string())
    }
}
