//! Dataset orchestrator: sample → score → bin, for N rows.
//!
//! Rows are produced in fixed-size blocks. Block `k` draws from its own
//! `StdRng` seeded from `(seed, k)`, so a dataset depends only on the seed and
//! the row count, never on how many threads built it.

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::domain::{CropSet, RiskLabel};
use crate::error::ConfigError;
use crate::record::LabeledRecord;
use crate::risk::{label_record, RiskScorer, ScoringWeights};
use crate::sampler::{ConstrainedSampler, CropSoilConstraints, SamplerConfig, SamplingMode};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Rows per RNG substream.
pub const BLOCK_SIZE: usize = 1024;

/// Row count of the reference training set.
pub const DEFAULT_ROWS: usize = 12_000;

pub const DEFAULT_SEED: u64 = 42;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Everything that determines a generated dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub rows: usize,
    pub mode: SamplingMode,
    pub crop_set: CropSet,
    pub sampler: SamplerConfig,
    pub weights: ScoringWeights,
    pub constraints: CropSoilConstraints,
}

impl GeneratorConfig {
    /// Six crops, soil constrained by crop. The variant shipped with the
    /// reference training data.
    pub fn constrained_six_crop() -> Self {
        Self {
            seed: DEFAULT_SEED,
            rows: DEFAULT_ROWS,
            mode: SamplingMode::Constrained,
            crop_set: CropSet::SixCrop,
            sampler: SamplerConfig::default(),
            weights: ScoringWeights::default(),
            constraints: CropSoilConstraints::default(),
        }
    }

    /// Five crops, soil independent of crop.
    pub fn unconstrained_five_crop() -> Self {
        Self {
            mode: SamplingMode::Unconstrained,
            crop_set: CropSet::FiveCrop,
            ..Self::constrained_six_crop()
        }
    }

    /// Short tag naming the generator variant, e.g. `constrained/six`.
    pub fn variant(&self) -> String {
        format!("{}/{}", self.mode, self.crop_set)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::constrained_six_crop()
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

/// An ordered, labeled dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub records: Vec<LabeledRecord>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabeledRecord> {
        self.records.iter()
    }

    pub fn class_distribution(&self) -> ClassDistribution {
        ClassDistribution::from_labels(self.records.iter().map(|r| r.label))
    }
}

/// Row count per risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ClassDistribution {
    counts: [usize; RiskLabel::COUNT],
}

impl ClassDistribution {
    pub fn from_labels(labels: impl IntoIterator<Item = RiskLabel>) -> Self {
        let mut counts = [0usize; RiskLabel::COUNT];
        for label in labels {
            counts[usize::from(label.level())] += 1;
        }
        Self { counts }
    }

    pub fn count(&self, label: RiskLabel) -> usize {
        self.counts[usize::from(label.level())]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(label, count, fraction)` in label order.
    pub fn rows(&self) -> impl Iterator<Item = (RiskLabel, usize, f64)> + '_ {
        let total = self.total().max(1) as f64;
        RiskLabel::ALL
            .into_iter()
            .map(move |l| (l, self.count(l), self.count(l) as f64 / total))
    }
}

impl fmt::Display for ClassDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, count, frac) in self.rows() {
            writeln!(f, "{} {:<9} {:>7} ({:>5.1}%)", label.level(), label, count, frac * 100.0)?;
        }
        Ok(())
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Seed of the RNG substream for block `block`.
pub fn block_seed(seed: u64, block: usize) -> u64 {
    seed ^ (block as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Generates labeled datasets for one configuration.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    sampler: ConstrainedSampler,
    scorer: RiskScorer,
    seed: u64,
}

impl DatasetBuilder {
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        let sampler = ConstrainedSampler::new(
            config.mode,
            config.crop_set,
            &config.sampler,
            &config.constraints,
        )?;
        Ok(Self {
            sampler,
            scorer: RiskScorer::new(config.weights),
            seed: config.seed,
        })
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    /// Build exactly `n` rows on the calling thread.
    pub fn build(&self, n: usize) -> Dataset {
        let mut records = Vec::with_capacity(n);
        for (block, len) in blocks(n) {
            self.fill_block(block, len, &mut records);
        }
        tracing::debug!(rows = records.len(), mode = %self.sampler.mode(), "dataset built");
        Dataset { records }
    }

    /// Build exactly `n` rows across the rayon pool. Identical to
    /// [`DatasetBuilder::build`] for the same seed.
    #[cfg(feature = "threading")]
    pub fn build_parallel(&self, n: usize) -> Dataset {
        use rayon::prelude::*;

        let chunks: Vec<Vec<LabeledRecord>> = blocks(n)
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(block, len)| {
                let mut out = Vec::with_capacity(len);
                self.fill_block(block, len, &mut out);
                out
            })
            .collect();

        let records: Vec<LabeledRecord> = chunks.into_iter().flatten().collect();
        tracing::debug!(rows = records.len(), mode = %self.sampler.mode(), "dataset built in parallel");
        Dataset { records }
    }

    fn fill_block(&self, block: usize, len: usize, out: &mut Vec<LabeledRecord>) {
        let mut rng = StdRng::seed_from_u64(block_seed(self.seed, block));
        for _ in 0..len {
            let features = self.sampler.sample(&mut rng);
            out.push(label_record(&self.scorer, features));
        }
    }
}

/// `(block index, rows in block)` covering `n` rows.
fn blocks(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n.div_ceil(BLOCK_SIZE)).map(move |b| (b, BLOCK_SIZE.min(n - b * BLOCK_SIZE)))
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::bin;

    #[test]
    fn builds_exactly_n_rows() {
        let builder = DatasetBuilder::new(&GeneratorConfig::default()).unwrap();
        for n in [0, 1, BLOCK_SIZE - 1, BLOCK_SIZE, BLOCK_SIZE + 1, 3 * BLOCK_SIZE + 17] {
            assert_eq!(builder.build(n).len(), n, "n={n}");
        }
    }

    #[test]
    fn labels_follow_score_then_bin() {
        let builder = DatasetBuilder::new(&GeneratorConfig::default()).unwrap();
        let ds = builder.build(2_000);
        for r in ds.iter() {
            assert_eq!(r.label, bin(builder.scorer().score(&r.features)));
        }
    }

    #[test]
    fn same_seed_same_dataset() {
        let cfg = GeneratorConfig { seed: 1234, ..GeneratorConfig::default() };
        let a = DatasetBuilder::new(&cfg).unwrap().build(3_000);
        let b = DatasetBuilder::new(&cfg).unwrap().build(3_000);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = DatasetBuilder::new(&GeneratorConfig { seed: 1, ..Default::default() })
            .unwrap()
            .build(100);
        let b = DatasetBuilder::new(&GeneratorConfig { seed: 2, ..Default::default() })
            .unwrap()
            .build(100);
        assert_ne!(a, b);
    }

    #[test]
    fn shorter_dataset_is_a_prefix_of_longer() {
        let builder = DatasetBuilder::new(&GeneratorConfig::default()).unwrap();
        let short = builder.build(1_500);
        let long = builder.build(4_000);
        assert_eq!(&short.records[..], &long.records[..1_500]);
    }

    #[test]
    fn block_seeds_are_distinct() {
        let seeds: std::collections::HashSet<u64> = (0..1_000).map(|b| block_seed(42, b)).collect();
        assert_eq!(seeds.len(), 1_000);
    }

    #[test]
    fn class_distribution_counts_every_row() {
        let ds = DatasetBuilder::new(&GeneratorConfig::default()).unwrap().build(5_000);
        let dist = ds.class_distribution();
        assert_eq!(dist.total(), 5_000);
        assert_eq!(RiskLabel::ALL.iter().map(|&l| dist.count(l)).sum::<usize>(), 5_000);
        // Reaching Low needs clay, flat ground and heavy rain; both classes
        // still show up at this size.
        assert!(dist.count(RiskLabel::NoRisk) > 0);
        assert!(dist.count(RiskLabel::Low) > 0);
    }

    #[test]
    fn presets_name_their_variant() {
        assert_eq!(GeneratorConfig::constrained_six_crop().variant(), "constrained/six");
        assert_eq!(GeneratorConfig::unconstrained_five_crop().variant(), "unconstrained/five");
    }

    #[test]
    fn config_round_trips_through_json_with_defaults() {
        let cfg: GeneratorConfig =
            serde_json::from_str(r#"{"seed": 9, "mode": "unconstrained", "crop_set": "five"}"#)
                .unwrap();
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.rows, DEFAULT_ROWS);
        assert_eq!(cfg, GeneratorConfig { seed: 9, ..GeneratorConfig::unconstrained_five_crop() });
    }

    // Runs under `cargo test --workspace` or `-p waterlog-core --features threading`.
    #[cfg(feature = "threading")]
    #[test]
    fn parallel_build_matches_sequential() {
        let builder = DatasetBuilder::new(&GeneratorConfig::default()).unwrap();
        let n = 5 * BLOCK_SIZE + 333;
        assert_eq!(builder.build(n), builder.build_parallel(n));
    }
}
