//! Reference classifier that applies the labelling rule directly.
//!
//! It decodes the positional vector back into typed features, scores and bins
//! them, and answers with a one-hot distribution. Useful as a baseline and for
//! exercising the service without a fitted model.

use serde::{Deserialize, Serialize};

use crate::domain::{CropType, RiskLabel, SlopeType, SoilType};
use crate::error::ClassifierError;
use crate::record::FeatureVector;
use crate::risk::{bin, RiskScorer, ScoringWeights};

use super::{Classifier, Probabilities};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreRuleSpec {
    #[serde(default)]
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreRuleClassifier {
    scorer: RiskScorer,
}

impl ScoreRuleClassifier {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { scorer: RiskScorer::new(weights) }
    }

    pub fn from_spec(spec: &ScoreRuleSpec) -> Self {
        Self::new(spec.weights)
    }

    pub fn label(&self, x: &FeatureVector) -> Result<RiskLabel, ClassifierError> {
        let soil = decode(x[4], "soil_type", SoilType::from_code)?;
        let slope = decode(x[5], "slope", SlopeType::from_code)?;
        let crop = decode(x[6], "crop_type", CropType::from_code)?;
        let score = self.scorer.score_features(x[0], x[1], x[2], x[3], soil, slope, crop);
        Ok(bin(score))
    }
}

fn decode<T>(
    v: f64,
    feature: &'static str,
    from_code: impl Fn(i64) -> Option<T>,
) -> Result<T, ClassifierError> {
    let code = v as i64;
    if v.fract() != 0.0 {
        return Err(ClassifierError::UnknownCode { feature, code });
    }
    from_code(code).ok_or(ClassifierError::UnknownCode { feature, code })
}

impl Classifier for ScoreRuleClassifier {
    fn predict_probabilities(&self, x: &FeatureVector) -> Result<Probabilities, ClassifierError> {
        let label = self.label(x)?;
        let mut p = [0.0; RiskLabel::COUNT];
        p[usize::from(label.level())] = 1.0;
        Ok(p)
    }

    fn kind(&self) -> &'static str {
        "score_rule"
    }
}
