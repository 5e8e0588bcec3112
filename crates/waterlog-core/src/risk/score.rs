//! Continuous waterlogging risk score.

use serde::{Deserialize, Serialize};

use crate::domain::{CropType, SlopeType, SoilType};
use crate::record::FeatureRecord;

/// Per-crop score penalty. Each crop is named explicitly so the weight of a
/// crop never depends on where it sits in the enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropPenalties {
    pub rice: f64,
    pub wheat: f64,
    pub maize: f64,
    pub sugarcane: f64,
    pub cotton: f64,
    pub vegetables: f64,
}

impl CropPenalties {
    pub fn get(&self, crop: CropType) -> f64 {
        match crop {
            CropType::Rice => self.rice,
            CropType::Wheat => self.wheat,
            CropType::Maize => self.maize,
            CropType::Sugarcane => self.sugarcane,
            CropType::Cotton => self.cotton,
            CropType::Vegetables => self.vegetables,
        }
    }
}

impl Default for CropPenalties {
    fn default() -> Self {
        Self {
            rice: 0.0,
            wheat: 2.0,
            maize: 4.0,
            sugarcane: 6.0,
            cotton: 8.0,
            vegetables: 10.0,
        }
    }
}

/// Linear score coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Per-mm weight of 7-day rainfall.
    pub rainfall_7d: f64,
    /// Per-mm weight of 3-day rainfall.
    pub rainfall_3d: f64,
    /// Per-mm weight of 1-day rainfall (unused by the default formula).
    pub rainfall_1d: f64,
    /// Per-percent weight of relative humidity.
    pub humidity: f64,
    /// Added when the soil is clay.
    pub clay_bonus: f64,
    /// Added when the field is flat.
    pub flat_bonus: f64,
    /// Subtracted per crop.
    pub crop_penalty: CropPenalties,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            rainfall_7d: 0.04,
            rainfall_3d: 0.02,
            rainfall_1d: 0.0,
            humidity: 0.01,
            clay_bonus: 15.0,
            flat_bonus: 10.0,
            crop_penalty: CropPenalties::default(),
        }
    }
}

/// Pure scorer over raw features.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskScorer {
    weights: ScoringWeights,
}

impl RiskScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score one record.
    pub fn score(&self, r: &FeatureRecord) -> f64 {
        self.score_features(
            r.rainfall_1d,
            r.rainfall_3d,
            r.rainfall_7d,
            r.humidity,
            r.soil,
            r.slope,
            r.crop,
        )
    }

    /// Score from individual fields.
    ///
    /// Terms are summed in a fixed order so that identical inputs always
    /// produce the same bit pattern.
    #[allow(clippy::too_many_arguments)]
    pub fn score_features(
        &self,
        rainfall_1d: f64,
        rainfall_3d: f64,
        rainfall_7d: f64,
        humidity: f64,
        soil: SoilType,
        slope: SlopeType,
        crop: CropType,
    ) -> f64 {
        let w = &self.weights;
        let clay = if soil == SoilType::Clay { w.clay_bonus } else { 0.0 };
        let flat = if slope == SlopeType::Flat { w.flat_bonus } else { 0.0 };

        w.rainfall_7d * rainfall_7d
            + w.rainfall_3d * rainfall_3d
            + w.humidity * humidity
            + w.rainfall_1d * rainfall_1d
            + clay
            + flat
            - w.crop_penalty.get(crop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(soil: SoilType, slope: SlopeType, crop: CropType) -> FeatureRecord {
        FeatureRecord {
            rainfall_1d: 12.0,
            rainfall_3d: 40.0,
            rainfall_7d: 100.0,
            humidity: 80.0,
            soil,
            slope,
            crop,
            days_since_sowing: 30,
        }
    }

    #[test]
    fn default_weights_match_formula() {
        let scorer = RiskScorer::default();
        // 0.04*100 + 0.02*40 + 0.01*80 + 15 + 10 - 0 = 4 + 0.8 + 0.8 + 25
        let s = scorer.score(&record(SoilType::Clay, SlopeType::Flat, CropType::Rice));
        assert_relative_eq!(s, 30.6, epsilon = 1e-12);

        let s = scorer.score(&record(SoilType::Loam, SlopeType::Steep, CropType::Cotton));
        assert_relative_eq!(s, 5.6 - 8.0, epsilon = 1e-12);
    }

    #[test]
    fn default_crop_penalty_is_twice_the_code() {
        let p = CropPenalties::default();
        for crop in CropType::ALL {
            assert_eq!(p.get(crop), 2.0 * f64::from(crop.code()));
        }
    }

    #[test]
    fn rainfall_1d_has_no_weight_by_default() {
        let scorer = RiskScorer::default();
        let mut a = record(SoilType::Sandy, SlopeType::Gentle, CropType::Maize);
        let base = scorer.score(&a);
        a.rainfall_1d = 900.0;
        assert_eq!(scorer.score(&a).to_bits(), base.to_bits());
    }

    #[test]
    fn repeated_scoring_is_bit_identical() {
        let scorer = RiskScorer::default();
        let r = FeatureRecord {
            rainfall_1d: 3.141_592,
            rainfall_3d: 17.327_1,
            rainfall_7d: 61.000_7,
            humidity: 63.29,
            soil: SoilType::Clay,
            slope: SlopeType::Gentle,
            crop: CropType::Sugarcane,
            days_since_sowing: 77,
        };
        let first = scorer.score(&r).to_bits();
        for _ in 0..100 {
            assert_eq!(scorer.score(&r).to_bits(), first);
        }
    }

    #[test]
    fn custom_crop_penalty_is_used_by_name() {
        let mut weights = ScoringWeights::default();
        weights.crop_penalty.vegetables = 0.0;
        let scorer = RiskScorer::new(weights);
        let veg = scorer.score(&record(SoilType::Loam, SlopeType::Steep, CropType::Vegetables));
        let rice = scorer.score(&record(SoilType::Loam, SlopeType::Steep, CropType::Rice));
        assert_eq!(veg, rice);
    }

    #[test]
    fn weights_deserialize_with_defaults_for_missing_fields() {
        let w: ScoringWeights = serde_json::from_str(r#"{"clay_bonus": 20.0}"#).unwrap();
        assert_eq!(w.clay_bonus, 20.0);
        assert_eq!(w.flat_bonus, 10.0);
        assert_eq!(w.crop_penalty, CropPenalties::default());
    }
}
