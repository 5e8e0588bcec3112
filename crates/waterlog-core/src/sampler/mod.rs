//! Synthetic feature-record sampling.
//!
//! Every draw consumes an explicitly passed RNG, so a seeded RNG and an
//! identical call sequence always reproduce the same records.
//!
//! Draw order per record:
//!   7-day rainfall (gamma) → 3-day ratio → 1-day ratio → humidity →
//!   crop → soil → slope → days since sowing.

pub mod params;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Gamma;

use crate::domain::{CropSet, CropType, SlopeType, SoilType};
use crate::error::ConfigError;
use crate::record::FeatureRecord;

pub use params::{CropSoilConstraints, DayRange, SamplerConfig, SamplingMode, UniformRange};

/// Draws one physically plausible `FeatureRecord` per call.
#[derive(Debug, Clone)]
pub struct ConstrainedSampler {
    mode: SamplingMode,
    crops: &'static [CropType],
    /// Allowed soils, parallel to `crops`. Only read in constrained mode.
    soils_by_crop: Vec<Vec<SoilType>>,
    rainfall_7d: Gamma<f64>,
    ratio_3d: Uniform<f64>,
    ratio_1d: Uniform<f64>,
    humidity: Uniform<f64>,
    days: Uniform<u32>,
}

impl ConstrainedSampler {
    /// Build a sampler, rejecting invalid distribution parameters and, in
    /// constrained mode, any crop without an allowed soil.
    pub fn new(
        mode: SamplingMode,
        crop_set: CropSet,
        config: &SamplerConfig,
        constraints: &CropSoilConstraints,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let crops = crop_set.members();
        let soils_by_crop = match mode {
            SamplingMode::Constrained => crops
                .iter()
                .map(|&crop| {
                    let allowed = constraints.allowed(crop);
                    if allowed.is_empty() {
                        Err(ConfigError::UnconstrainedCrop { crop: crop.name() })
                    } else {
                        Ok(allowed.to_vec())
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            SamplingMode::Unconstrained => Vec::new(),
        };

        let rainfall_7d = Gamma::new(config.rainfall_7d_shape, config.rainfall_7d_scale)
            .map_err(|_| ConfigError::InvalidGamma {
                shape: config.rainfall_7d_shape,
                scale: config.rainfall_7d_scale,
            })?;

        Ok(Self {
            mode,
            crops,
            soils_by_crop,
            rainfall_7d,
            ratio_3d: Uniform::new(config.ratio_3d_of_7d.low, config.ratio_3d_of_7d.high),
            ratio_1d: Uniform::new(config.ratio_1d_of_3d.low, config.ratio_1d_of_3d.high),
            humidity: Uniform::new(config.humidity.low, config.humidity.high),
            days: Uniform::new(config.days_since_sowing.low, config.days_since_sowing.high),
        })
    }

    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Draw one record, advancing `rng`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> FeatureRecord {
        let rainfall_7d = self.rainfall_7d.sample(rng);
        let rainfall_3d = rainfall_7d * self.ratio_3d.sample(rng);
        let rainfall_1d = rainfall_3d * self.ratio_1d.sample(rng);
        let humidity = self.humidity.sample(rng);

        let crop_idx = rng.gen_range(0..self.crops.len());
        let crop = self.crops[crop_idx];

        let soil = match self.mode {
            SamplingMode::Constrained => {
                let allowed = &self.soils_by_crop[crop_idx];
                allowed[rng.gen_range(0..allowed.len())]
            }
            SamplingMode::Unconstrained => SoilType::ALL[rng.gen_range(0..SoilType::ALL.len())],
        };

        let slope = SlopeType::ALL[rng.gen_range(0..SlopeType::ALL.len())];
        let days_since_sowing = self.days.sample(rng);

        FeatureRecord {
            rainfall_1d,
            rainfall_3d,
            rainfall_7d,
            humidity,
            soil,
            slope,
            crop,
            days_since_sowing,
        }
    }
}
