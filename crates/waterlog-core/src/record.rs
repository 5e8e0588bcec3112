use serde::{Deserialize, Serialize};

use crate::domain::{CropType, RiskLabel, SlopeType, SoilType};

/// Dataset column order. Training and serving both consume feature vectors
/// positionally, so this order must never change.
pub const COLUMNS: [&str; 9] = [
    "rainfall_1d",
    "rainfall_3d",
    "rainfall_7d",
    "humidity",
    "soil_type",
    "slope",
    "crop_type",
    "days_since_sowing",
    "waterlogging_risk",
];

/// Number of model input features (every column except the label).
pub const FEATURE_COUNT: usize = 8;

/// The feature columns, in vector order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3],
    COLUMNS[4], COLUMNS[5], COLUMNS[6], COLUMNS[7],
];

/// A positional model input vector.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// One synthetic field observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Rainfall over the last day, mm.
    pub rainfall_1d: f64,
    /// Rainfall over the last 3 days, mm.
    pub rainfall_3d: f64,
    /// Rainfall over the last 7 days, mm.
    pub rainfall_7d: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    pub soil: SoilType,
    pub slope: SlopeType,
    pub crop: CropType,
    pub days_since_sowing: u32,
}

impl FeatureRecord {
    /// Feature vector in `FEATURE_COLUMNS` order, categoricals as codes.
    pub fn to_vector(&self) -> FeatureVector {
        [
            self.rainfall_1d,
            self.rainfall_3d,
            self.rainfall_7d,
            self.humidity,
            f64::from(self.soil.code()),
            f64::from(self.slope.code()),
            f64::from(self.crop.code()),
            f64::from(self.days_since_sowing),
        ]
    }
}

/// A feature record with the label derived from its risk score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub features: FeatureRecord,
    pub label: RiskLabel,
}
