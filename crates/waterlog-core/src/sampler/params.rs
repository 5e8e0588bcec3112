use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{CropType, SoilType};
use crate::error::ConfigError;

/// How the soil type of a sample is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Soil drawn uniformly from the crop's allowed soils.
    #[default]
    Constrained,
    /// Soil drawn uniformly from all soils, independent of crop.
    Unconstrained,
}

impl FromStr for SamplingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constrained" => Ok(SamplingMode::Constrained),
            "unconstrained" => Ok(SamplingMode::Unconstrained),
            other => Err(format!(
                "unknown sampling mode `{other}` (expected `constrained` or `unconstrained`)"
            )),
        }
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SamplingMode::Constrained => "constrained",
            SamplingMode::Unconstrained => "unconstrained",
        })
    }
}

/// Half-open `[low, high)` interval for a continuous uniform draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub low: f64,
    pub high: f64,
}

impl UniformRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn check(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.low.is_finite() && self.high.is_finite() && self.low < self.high {
            Ok(())
        } else {
            Err(ConfigError::EmptyRange { name, low: self.low, high: self.high })
        }
    }

    fn check_ratio(&self, name: &'static str) -> Result<(), ConfigError> {
        self.check(name)?;
        if self.low >= 0.0 && self.high <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::RatioOutsideUnit { name, low: self.low, high: self.high })
        }
    }
}

/// Half-open `[low, high)` interval of whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub low: u32,
    pub high: u32,
}

/// Distribution parameters for one synthetic sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Gamma shape for 7-day rainfall.
    pub rainfall_7d_shape: f64,
    /// Gamma scale for 7-day rainfall, mm.
    pub rainfall_7d_scale: f64,
    /// Fraction of 7-day rainfall that fell in the last 3 days.
    pub ratio_3d_of_7d: UniformRange,
    /// Fraction of 3-day rainfall that fell in the last day.
    pub ratio_1d_of_3d: UniformRange,
    /// Relative humidity, percent.
    pub humidity: UniformRange,
    pub days_since_sowing: DayRange,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            rainfall_7d_shape: 2.0,
            rainfall_7d_scale: 25.0,
            ratio_3d_of_7d: UniformRange::new(0.3, 0.7),
            ratio_1d_of_3d: UniformRange::new(0.2, 0.5),
            humidity: UniformRange::new(40.0, 95.0),
            days_since_sowing: DayRange { low: 5, high: 120 },
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (shape, scale) = (self.rainfall_7d_shape, self.rainfall_7d_scale);
        if !(shape.is_finite() && scale.is_finite() && shape > 0.0 && scale > 0.0) {
            return Err(ConfigError::InvalidGamma { shape, scale });
        }
        self.ratio_3d_of_7d.check_ratio("ratio_3d_of_7d")?;
        self.ratio_1d_of_3d.check_ratio("ratio_1d_of_3d")?;
        self.humidity.check("humidity")?;
        if self.days_since_sowing.low >= self.days_since_sowing.high {
            return Err(ConfigError::EmptyRange {
                name: "days_since_sowing",
                low: f64::from(self.days_since_sowing.low),
                high: f64::from(self.days_since_sowing.high),
            });
        }
        Ok(())
    }
}

/// Soils each crop may be grown on, used in constrained sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropSoilConstraints(BTreeMap<CropType, Vec<SoilType>>);

impl CropSoilConstraints {
    pub fn new(table: BTreeMap<CropType, Vec<SoilType>>) -> Self {
        Self(table)
    }

    /// Allowed soils for `crop`; empty when the crop is not in the table.
    pub fn allowed(&self, crop: CropType) -> &[SoilType] {
        self.0.get(&crop).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn allows(&self, crop: CropType, soil: SoilType) -> bool {
        self.allowed(crop).contains(&soil)
    }
}

impl Default for CropSoilConstraints {
    fn default() -> Self {
        use CropType::*;
        use SoilType::*;

        let table = BTreeMap::from([
            (Rice, vec![Clay, Loam]),
            (Wheat, vec![Loam, Sandy]),
            (Maize, vec![Loam, Sandy]),
            (Sugarcane, vec![Clay, Loam]),
            (Cotton, vec![Loam, Sandy]),
            (Vegetables, vec![Loam, Sandy]),
        ]);
        Self(table)
    }
}
