/// Synthetic waterlogging-risk dataset generator.
///
/// Samples feature records, labels them with the linear risk score, and writes
/// the training CSV. Optionally writes a score-rule model artifact matching the
/// configured weights, so the server can run before a fitted model exists.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use waterlog_core::dataset::write_csv_file;
use waterlog_core::generator::DatasetBuilder;
use waterlog_core::{CropSet, GeneratorConfig, ModelArtifact, SamplingMode};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "generate", about = "Generate a labeled waterlogging-risk training dataset")]
struct Args {
    /// Number of rows [default: 12000, or the config file's value]
    #[arg(long)]
    rows: Option<usize>,

    /// RNG seed [default: 42, or the config file's value]
    #[arg(long)]
    seed: Option<u64>,

    /// Soil sampling: `constrained` (by crop) or `unconstrained`
    #[arg(long)]
    mode: Option<SamplingMode>,

    /// Crop set: `five` (no vegetables) or `six`
    #[arg(long)]
    crop_set: Option<CropSet>,

    /// JSON generator config; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long, default_value = "india_waterlogging_training_data.csv")]
    output: PathBuf,

    /// Also write a score-rule model artifact to this path
    #[arg(long)]
    reference_model: Option<PathBuf>,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn generator_config(&self) -> Result<GeneratorConfig> {
        let mut config: GeneratorConfig = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => GeneratorConfig::default(),
        };
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(crop_set) = self.crop_set {
            config.crop_set = crop_set;
        }
        Ok(config)
    }
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "generate=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.generator_config()?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    tracing::info!(
        variant = %config.variant(),
        rows = config.rows,
        seed = config.seed,
        "generating dataset"
    );

    let builder = DatasetBuilder::new(&config).context("invalid generator config")?;
    let dataset = builder.build_parallel(config.rows);

    write_csv_file(&dataset, &args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    tracing::info!(rows = dataset.len(), path = %args.output.display(), "dataset written");

    for (label, count, frac) in dataset.class_distribution().rows() {
        tracing::info!(
            level = label.level(),
            label = %label,
            count,
            percent = %format!("{:.1}", frac * 100.0),
            "class distribution"
        );
    }

    if let Some(path) = &args.reference_model {
        let json = ModelArtifact::score_rule(config.weights).to_json_pretty()?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "reference score-rule artifact written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "generate", "--rows", "50", "--seed", "7", "--mode", "unconstrained", "--crop-set", "five",
        ]);
        let c = args.generator_config().unwrap();
        assert_eq!(c.rows, 50);
        assert_eq!(c.seed, 7);
        assert_eq!(c.mode, SamplingMode::Unconstrained);
        assert_eq!(c.crop_set, CropSet::FiveCrop);
        assert_eq!(c.variant(), "unconstrained/five");
    }

    #[test]
    fn no_flags_is_the_default_preset() {
        let args = Args::parse_from(["generate"]);
        assert_eq!(args.generator_config().unwrap(), GeneratorConfig::default());
        assert_eq!(args.output, PathBuf::from("india_waterlogging_training_data.csv"));
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Args::try_parse_from(["generate", "--mode", "sideways"]).is_err());
    }
}
