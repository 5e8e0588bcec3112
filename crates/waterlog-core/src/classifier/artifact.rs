//! Versioned, self-describing model artifact.
//!
//! ```json
//! { "format_version": 1, "n_features": 8,
//!   "model": { "type": "gradient_boosted", "learning_rate": 1.0,
//!              "base_scores": [0, 0, 0, 0, 0], "class_trees": [[...], ...] } }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::record::FEATURE_COUNT;
use crate::risk::ScoringWeights;

use super::gbm::{GbmClassifier, GbmSpec};
use super::score_rule::{ScoreRuleClassifier, ScoreRuleSpec};
use super::Classifier;

/// Artifact layout version understood by this build.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    GradientBoosted(GbmSpec),
    ScoreRule(ScoreRuleSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub n_features: usize,
    pub model: ModelSpec,
}

impl ModelArtifact {
    pub fn new(model: ModelSpec) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            n_features: FEATURE_COUNT,
            model,
        }
    }

    /// Reference artifact that reproduces the labelling rule for `weights`.
    pub fn score_rule(weights: ScoringWeights) -> Self {
        Self::new(ModelSpec::ScoreRule(ScoreRuleSpec { weights }))
    }

    pub fn from_json(text: &str) -> Result<Self, ClassifierError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ClassifierError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the header and build the engine.
    pub fn into_classifier(self) -> Result<Arc<dyn Classifier>, ClassifierError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ClassifierError::UnsupportedVersion {
                found: self.format_version,
                supported: FORMAT_VERSION,
            });
        }
        if self.n_features != FEATURE_COUNT {
            return Err(ClassifierError::FeatureCount {
                found: self.n_features,
                expected: FEATURE_COUNT,
            });
        }
        let classifier: Arc<dyn Classifier> = match &self.model {
            ModelSpec::GradientBoosted(spec) => Arc::new(GbmClassifier::from_spec(spec)?),
            ModelSpec::ScoreRule(spec) => Arc::new(ScoreRuleClassifier::from_spec(spec)),
        };
        Ok(classifier)
    }
}

/// Load a classifier from an artifact file.
pub fn load_classifier(path: &Path) -> Result<Arc<dyn Classifier>, ClassifierError> {
    let text = std::fs::read_to_string(path).map_err(|source| ClassifierError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let classifier = ModelArtifact::from_json(&text)?.into_classifier()?;
    tracing::info!(path = %path.display(), kind = classifier.kind(), "model artifact loaded");
    Ok(classifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GBM_JSON: &str = r#"{
        "format_version": 1,
        "n_features": 8,
        "model": {
            "type": "gradient_boosted",
            "learning_rate": 1.0,
            "base_scores": [0.0, 0.0, 0.0, 0.0, 0.0],
            "class_trees": [
                [{"feature": [2, -1, -1], "threshold": [30.0, 0.0, 0.0],
                  "left": [1, -1, -1], "right": [2, -1, -1], "value": [0.0, 5.0, -5.0]}],
                [], [], [], []
            ]
        }
    }"#;

    #[test]
    fn loads_gradient_boosted_artifact_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GBM_JSON.as_bytes()).unwrap();

        let c = load_classifier(file.path()).unwrap();
        assert_eq!(c.kind(), "gradient_boosted");
        let p = c.predict_probabilities(&[0.0, 0.0, 5.0, 50.0, 1.0, 1.0, 1.0, 10.0]).unwrap();
        assert!(p[0] > 0.9);
    }

    #[test]
    fn score_rule_artifact_round_trips() {
        let artifact = ModelArtifact::score_rule(ScoringWeights::default());
        let json = artifact.to_json_pretty().unwrap();
        assert!(json.contains("\"type\": \"score_rule\""));
        let back = ModelArtifact::from_json(&json).unwrap();
        assert_eq!(back, artifact);
        assert_eq!(back.into_classifier().unwrap().kind(), "score_rule");
    }

    #[test]
    fn rejects_future_format_version() {
        let mut artifact = ModelArtifact::score_rule(ScoringWeights::default());
        artifact.format_version = 2;
        assert!(matches!(
            artifact.into_classifier(),
            Err(ClassifierError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn rejects_wrong_feature_count() {
        let mut artifact = ModelArtifact::score_rule(ScoringWeights::default());
        artifact.n_features = 9;
        assert!(matches!(
            artifact.into_classifier(),
            Err(ClassifierError::FeatureCount { found: 9, expected: 8 })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_classifier(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, ClassifierError::Read { .. }));
    }

    #[test]
    fn unknown_model_type_is_a_parse_error() {
        let json = r#"{"format_version": 1, "n_features": 8, "model": {"type": "pickle"}}"#;
        assert!(matches!(ModelArtifact::from_json(json), Err(ClassifierError::Parse(_))));
    }
}
