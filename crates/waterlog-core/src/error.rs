//! Error types for the generation and prediction pipelines.

use thiserror::Error;

/// Invalid generator, sampler, or scoring configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("gamma distribution needs positive shape and scale, got shape={shape} scale={scale}")]
    InvalidGamma { shape: f64, scale: f64 },

    #[error("range `{name}` is empty or inverted: [{low}, {high})")]
    EmptyRange { name: &'static str, low: f64, high: f64 },

    #[error("ratio `{name}` must lie within [0, 1], got [{low}, {high})")]
    RatioOutsideUnit { name: &'static str, low: f64, high: f64 },

    #[error("crop `{crop}` has no allowed soil types in the constraint table")]
    UnconstrainedCrop { crop: &'static str },
}

/// CSV persistence failures.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("unexpected header: expected `{expected}`, found `{found}`")]
    Header { expected: String, found: String },

    #[error("row {row}: {message}")]
    Row { row: usize, message: String },
}

/// Classifier artifact loading and inference failures.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("cannot read model artifact {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported artifact format_version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("artifact declares {found} features, the schema has {expected}")]
    FeatureCount { found: usize, expected: usize },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("feature `{feature}` has code {code} outside the known range")]
    UnknownCode { feature: &'static str, code: i64 },
}

/// Failure while answering one prediction request.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),
}

/// A request field that fails boundary validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("`{field}` must be a finite number")]
    NotFinite { field: &'static str },

    #[error("`{field}` must be between {min} and {max}, got {value}")]
    OutsideDomain {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("`{field}` must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}
