//! Categorical feature enumerations and the ordinal risk label.
//!
//! Every enum carries an explicit integer `code()`. Codes are the wire and CSV
//! representation; they are assigned by hand, so reordering variants never
//! changes a dataset or a request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Soil texture class of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilType {
    Clay,
    Loam,
    Sandy,
}

impl SoilType {
    pub const ALL: [SoilType; 3] = [SoilType::Clay, SoilType::Loam, SoilType::Sandy];

    pub const fn code(self) -> u8 {
        match self {
            SoilType::Clay => 0,
            SoilType::Loam => 1,
            SoilType::Sandy => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SoilType::Clay),
            1 => Some(SoilType::Loam),
            2 => Some(SoilType::Sandy),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SoilType::Clay => "clay",
            SoilType::Loam => "loam",
            SoilType::Sandy => "sandy",
        }
    }
}

/// Field slope class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeType {
    Flat,
    Gentle,
    Steep,
}

impl SlopeType {
    pub const ALL: [SlopeType; 3] = [SlopeType::Flat, SlopeType::Gentle, SlopeType::Steep];

    pub const fn code(self) -> u8 {
        match self {
            SlopeType::Flat => 0,
            SlopeType::Gentle => 1,
            SlopeType::Steep => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SlopeType::Flat),
            1 => Some(SlopeType::Gentle),
            2 => Some(SlopeType::Steep),
            _ => None,
        }
    }
}

/// Crop grown on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Rice,
    Wheat,
    Maize,
    Sugarcane,
    Cotton,
    Vegetables,
}

impl CropType {
    pub const ALL: [CropType; 6] = [
        CropType::Rice,
        CropType::Wheat,
        CropType::Maize,
        CropType::Sugarcane,
        CropType::Cotton,
        CropType::Vegetables,
    ];

    pub const fn code(self) -> u8 {
        match self {
            CropType::Rice => 0,
            CropType::Wheat => 1,
            CropType::Maize => 2,
            CropType::Sugarcane => 3,
            CropType::Cotton => 4,
            CropType::Vegetables => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|c| i64::from(c.code()) == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            CropType::Rice => "rice",
            CropType::Wheat => "wheat",
            CropType::Maize => "maize",
            CropType::Sugarcane => "sugarcane",
            CropType::Cotton => "cotton",
            CropType::Vegetables => "vegetables",
        }
    }
}

/// Which crop enumeration a dataset or model uses.
///
/// Two generator variants exist upstream, one with five crops and one with
/// six. They yield different training distributions, so the choice is always
/// explicit and never mixed within one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CropSet {
    /// Rice, wheat, maize, sugarcane, cotton.
    #[serde(rename = "five")]
    FiveCrop,
    /// The five above plus vegetables.
    #[default]
    #[serde(rename = "six")]
    SixCrop,
}

impl CropSet {
    pub fn members(self) -> &'static [CropType] {
        match self {
            CropSet::FiveCrop => &CropType::ALL[..5],
            CropSet::SixCrop => &CropType::ALL,
        }
    }

    pub fn contains(self, crop: CropType) -> bool {
        self.members().contains(&crop)
    }

    /// Highest valid crop code in this set.
    pub fn max_code(self) -> u8 {
        self.members().iter().map(|c| c.code()).max().unwrap_or(0)
    }
}

impl FromStr for CropSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "five" | "5" => Ok(CropSet::FiveCrop),
            "six" | "6" => Ok(CropSet::SixCrop),
            other => Err(format!("unknown crop set `{other}` (expected `five` or `six`)")),
        }
    }
}

impl fmt::Display for CropSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CropSet::FiveCrop => "five",
            CropSet::SixCrop => "six",
        })
    }
}

/// Ordinal waterlogging risk, NoRisk < Low < Moderate < High < Severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLabel {
    NoRisk,
    Low,
    Moderate,
    High,
    Severe,
}

impl RiskLabel {
    pub const ALL: [RiskLabel; 5] = [
        RiskLabel::NoRisk,
        RiskLabel::Low,
        RiskLabel::Moderate,
        RiskLabel::High,
        RiskLabel::Severe,
    ];

    pub const COUNT: usize = 5;

    pub const fn level(self) -> u8 {
        match self {
            RiskLabel::NoRisk => 0,
            RiskLabel::Low => 1,
            RiskLabel::Moderate => 2,
            RiskLabel::High => 3,
            RiskLabel::Severe => 4,
        }
    }

    pub fn from_level(level: i64) -> Option<Self> {
        usize::try_from(level).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Wire name, e.g. `"NO_RISK"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            RiskLabel::NoRisk => "NO_RISK",
            RiskLabel::Low => "LOW",
            RiskLabel::Moderate => "MODERATE",
            RiskLabel::High => "HIGH",
            RiskLabel::Severe => "SEVERE",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_from_code() {
        for soil in SoilType::ALL {
            assert_eq!(SoilType::from_code(i64::from(soil.code())), Some(soil));
        }
        for slope in SlopeType::ALL {
            assert_eq!(SlopeType::from_code(i64::from(slope.code())), Some(slope));
        }
        for crop in CropType::ALL {
            assert_eq!(CropType::from_code(i64::from(crop.code())), Some(crop));
        }
        assert_eq!(SoilType::from_code(3), None);
        assert_eq!(CropType::from_code(-1), None);
    }

    #[test]
    fn crop_sets_are_prefixes_of_the_full_enumeration() {
        assert_eq!(CropSet::FiveCrop.members().len(), 5);
        assert_eq!(CropSet::SixCrop.members().len(), 6);
        assert!(!CropSet::FiveCrop.contains(CropType::Vegetables));
        assert_eq!(CropSet::FiveCrop.max_code(), 4);
        assert_eq!(CropSet::SixCrop.max_code(), 5);
    }

    #[test]
    fn crop_set_parses_names_and_counts() {
        assert_eq!("six".parse::<CropSet>(), Ok(CropSet::SixCrop));
        assert_eq!(" 5 ".parse::<CropSet>(), Ok(CropSet::FiveCrop));
        assert!("seven".parse::<CropSet>().is_err());
    }

    #[test]
    fn risk_labels_are_totally_ordered_by_level() {
        for pair in RiskLabel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].level() + 1, pair[1].level());
        }
        assert_eq!(RiskLabel::from_level(4), Some(RiskLabel::Severe));
        assert_eq!(RiskLabel::from_level(5), None);
        assert_eq!(RiskLabel::from_level(-1), None);
    }

    #[test]
    fn risk_label_serializes_to_wire_name() {
        let json = serde_json::to_string(&RiskLabel::NoRisk).unwrap();
        assert_eq!(json, "\"NO_RISK\"");
        assert_eq!(RiskLabel::Moderate.to_string(), "MODERATE");
    }
}
