//! Waterlogging-risk synthetic data generation and prediction.
//!
//! Generation: [`sampler`] draws plausible feature records, [`risk`] labels
//! them, [`generator`] assembles seeded datasets and [`dataset`] persists them.
//! Prediction: [`predict`] answers requests through a [`classifier`] engine.

pub mod classifier;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod generator;
pub mod predict;
pub mod record;
pub mod risk;
pub mod sampler;

pub use classifier::{load_classifier, Classifier, ModelArtifact};
pub use domain::{CropSet, CropType, RiskLabel, SlopeType, SoilType};
pub use error::{ClassifierError, ConfigError, DatasetError, PredictError, ValidationError};
pub use generator::{ClassDistribution, Dataset, DatasetBuilder, GeneratorConfig};
pub use predict::{FeatureInput, OverrideRule, PredictionResult, PredictionService};
pub use record::{FeatureRecord, FeatureVector, LabeledRecord};
pub use risk::{RiskScorer, ScoringWeights};
pub use sampler::{ConstrainedSampler, SamplerConfig, SamplingMode};
