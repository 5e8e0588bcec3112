//! Label derivation: a linear risk score followed by fixed-threshold binning.

pub mod binning;
pub mod score;

pub use binning::{bin, CUT_POINTS};
pub use score::{CropPenalties, RiskScorer, ScoringWeights};

use crate::domain::RiskLabel;
use crate::record::{FeatureRecord, LabeledRecord};

/// Score a record and attach its label.
pub fn label_record(scorer: &RiskScorer, features: FeatureRecord) -> LabeledRecord {
    let label: RiskLabel = bin(scorer.score(&features));
    LabeledRecord { features, label }
}
