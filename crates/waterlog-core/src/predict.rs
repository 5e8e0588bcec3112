//! Request-time decision layer.
//!
//! A request either trips the dry-week override and is answered directly, or
//! is turned into a positional feature vector for the classifier.

use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::classifier::{Classifier, Probabilities};
use crate::domain::{CropSet, RiskLabel, SlopeType, SoilType};
use crate::error::{PredictError, ValidationError};
use crate::record::{FeatureRecord, FeatureVector};

/// Note attached to every override answer.
pub const OVERRIDE_NOTE: &str = "Rainfall too low for flooding";

/// Tolerance on `|Σp − 1|` before a distribution is reported as degenerate.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

// ── Request ───────────────────────────────────────────────────────────────────

/// Upper bound of relative humidity, percent.
const MAX_HUMIDITY: f64 = 100.0;

/// Raw prediction request. Categorical fields are unvalidated integer codes
/// and reach the classifier exactly as sent. Integer fields also accept
/// integral JSON floats such as `20.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureInput {
    pub rainfall_1d: f64,
    pub rainfall_3d: f64,
    pub rainfall_7d: f64,
    pub humidity: f64,
    #[serde(deserialize_with = "integral")]
    pub soil_type: i64,
    #[serde(deserialize_with = "integral")]
    pub slope: i64,
    #[serde(deserialize_with = "integral")]
    pub crop_type: i64,
    #[serde(deserialize_with = "integral")]
    pub days_since_sowing: i64,
}

/// An integer, or a float with no fractional part.
fn integral<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    // Beyond 2^53 a float no longer names a unique integer.
    const EXACT: f64 = 9_007_199_254_740_992.0;

    match Number::deserialize(deserializer)? {
        Number::Int(v) => Ok(v),
        Number::Float(f) if f.fract() == 0.0 && f.abs() <= EXACT => Ok(f as i64),
        Number::Float(f) => Err(D::Error::custom(format!("expected an integer, got {f}"))),
    }
}

impl FeatureInput {
    /// Feature vector in dataset column order.
    pub fn to_vector(&self) -> FeatureVector {
        [
            self.rainfall_1d,
            self.rainfall_3d,
            self.rainfall_7d,
            self.humidity,
            self.soil_type as f64,
            self.slope as f64,
            self.crop_type as f64,
            self.days_since_sowing as f64,
        ]
    }

    /// Range checks for the HTTP boundary: finite non-negative rainfall,
    /// humidity within 0–100 %, known category codes, and a non-negative
    /// day count.
    pub fn validate(&self, crop_set: CropSet) -> Result<(), ValidationError> {
        for (field, v, max) in [
            ("rainfall_1d", self.rainfall_1d, f64::INFINITY),
            ("rainfall_3d", self.rainfall_3d, f64::INFINITY),
            ("rainfall_7d", self.rainfall_7d, f64::INFINITY),
            ("humidity", self.humidity, MAX_HUMIDITY),
        ] {
            if !v.is_finite() {
                return Err(ValidationError::NotFinite { field });
            }
            if !(0.0..=max).contains(&v) {
                return Err(ValidationError::OutsideDomain { field, value: v, min: 0.0, max });
            }
        }

        check_code("soil_type", self.soil_type, SoilType::ALL.len() as i64 - 1)?;
        check_code("slope", self.slope, SlopeType::ALL.len() as i64 - 1)?;
        check_code("crop_type", self.crop_type, i64::from(crop_set.max_code()))?;
        if self.days_since_sowing < 0 {
            return Err(ValidationError::OutOfRange {
                field: "days_since_sowing",
                value: self.days_since_sowing,
                min: 0,
                max: i64::MAX,
            });
        }
        Ok(())
    }
}

fn check_code(field: &'static str, value: i64, max: i64) -> Result<(), ValidationError> {
    if (0..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, value, min: 0, max })
    }
}

impl From<&FeatureRecord> for FeatureInput {
    fn from(r: &FeatureRecord) -> Self {
        Self {
            rainfall_1d: r.rainfall_1d,
            rainfall_3d: r.rainfall_3d,
            rainfall_7d: r.rainfall_7d,
            humidity: r.humidity,
            soil_type: i64::from(r.soil.code()),
            slope: i64::from(r.slope.code()),
            crop_type: i64::from(r.crop.code()),
            days_since_sowing: i64::from(r.days_since_sowing),
        }
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

/// Probability per label, serialised under the label's wire name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelProbabilities {
    #[serde(rename = "NO_RISK")]
    pub no_risk: f64,
    #[serde(rename = "LOW")]
    pub low: f64,
    #[serde(rename = "MODERATE")]
    pub moderate: f64,
    #[serde(rename = "HIGH")]
    pub high: f64,
    #[serde(rename = "SEVERE")]
    pub severe: f64,
}

impl LabelProbabilities {
    pub fn get(&self, label: RiskLabel) -> f64 {
        match label {
            RiskLabel::NoRisk => self.no_risk,
            RiskLabel::Low => self.low,
            RiskLabel::Moderate => self.moderate,
            RiskLabel::High => self.high,
            RiskLabel::Severe => self.severe,
        }
    }

    pub fn certain(label: RiskLabel) -> Self {
        let mut p = [0.0; RiskLabel::COUNT];
        p[usize::from(label.level())] = 1.0;
        p.into()
    }
}

impl From<Probabilities> for LabelProbabilities {
    fn from(p: Probabilities) -> Self {
        let [no_risk, low, moderate, high, severe] = p;
        Self { no_risk, low, moderate, high, severe }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub risk_level: u8,
    pub risk_label: RiskLabel,
    pub probabilities: LabelProbabilities,
    pub confidence: f64,
    /// Only present when the override answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ── Service ───────────────────────────────────────────────────────────────────

/// Deterministic short-circuit: no meaningful rain in the last week means no
/// waterlogging, whatever the model would say.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverrideRule {
    /// Requests with `rainfall_7d` strictly below this are answered NoRisk.
    pub min_rainfall_7d: f64,
}

impl OverrideRule {
    pub fn applies(&self, input: &FeatureInput) -> bool {
        input.rainfall_7d < self.min_rainfall_7d
    }

    fn answer(&self) -> PredictionResult {
        PredictionResult {
            risk_level: RiskLabel::NoRisk.level(),
            risk_label: RiskLabel::NoRisk,
            probabilities: LabelProbabilities::certain(RiskLabel::NoRisk),
            confidence: 1.0,
            note: Some(OVERRIDE_NOTE.to_string()),
        }
    }
}

impl Default for OverrideRule {
    fn default() -> Self {
        Self { min_rainfall_7d: 1.0 }
    }
}

/// Index of the largest probability; ties go to the lowest index.
pub fn argmax(p: &Probabilities) -> usize {
    (1..p.len()).fold(0, |best, i| if p[i] > p[best] { i } else { best })
}

/// Stateless per call; cheap to clone into each request handler.
#[derive(Debug, Clone)]
pub struct PredictionService {
    classifier: Arc<dyn Classifier>,
    rule: OverrideRule,
}

impl PredictionService {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier, rule: OverrideRule::default() }
    }

    pub fn with_override(mut self, rule: OverrideRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn override_rule(&self) -> &OverrideRule {
        &self.rule
    }

    pub fn classifier_kind(&self) -> &'static str {
        self.classifier.kind()
    }

    pub fn predict(&self, input: &FeatureInput) -> Result<PredictionResult, PredictError> {
        if self.rule.applies(input) {
            tracing::debug!(rainfall_7d = input.rainfall_7d, "override: rainfall too low");
            return Ok(self.rule.answer());
        }

        let vector = input.to_vector();
        let probs = self.classifier.predict_probabilities(&vector)?;

        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            tracing::warn!(sum, kind = self.classifier.kind(), "classifier probabilities do not sum to 1");
        }

        let idx = argmax(&probs);
        let label = RiskLabel::ALL[idx];
        Ok(PredictionResult {
            risk_level: label.level(),
            risk_label: label,
            probabilities: probs.into(),
            confidence: probs[idx],
            note: None,
        })
    }
}
