//! The classifier capability consulted by the prediction service.
//!
//! The service only sees [`Classifier`]; how a model is stored or evaluated
//! stays behind [`load_classifier`].

pub mod artifact;
pub mod gbm;
pub mod score_rule;

pub use artifact::{load_classifier, ModelArtifact, ModelSpec, FORMAT_VERSION};
pub use gbm::{GbmClassifier, GbmSpec, TreeArrays};
pub use score_rule::{ScoreRuleClassifier, ScoreRuleSpec};

use std::fmt;

use crate::domain::RiskLabel;
use crate::error::ClassifierError;
use crate::record::FeatureVector;

/// One probability per risk label, in label order.
pub type Probabilities = [f64; RiskLabel::COUNT];

/// Maps a positional feature vector to a distribution over risk labels.
///
/// Inference takes `&self` and implementors must be `Send + Sync`: one loaded
/// model serves every concurrent request without locking. An engine with
/// internal mutable state has to synchronise it itself.
pub trait Classifier: Send + Sync + fmt::Debug {
    fn predict_probabilities(&self, features: &FeatureVector) -> Result<Probabilities, ClassifierError>;

    /// Engine name for logs.
    fn kind(&self) -> &'static str;
}
