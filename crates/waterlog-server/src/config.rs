//! Server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use waterlog_core::CropSet;

/// Wildcard entry in `CORS_ALLOWED_ORIGINS`.
pub const ANY_ORIGIN: &str = "*";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Classifier artifact loaded at startup
    pub model_path: PathBuf,

    /// Origins allowed to call the API; `*` allows any
    pub cors_allowed_origins: Vec<String>,

    /// Range-check request fields before prediction
    pub strict_validation: bool,

    /// Crop codes accepted when validating requests
    pub crop_set: CropSet,

    /// `rainfall_7d` below this is answered NoRisk without the classifier
    pub override_min_rainfall_7d: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_path: PathBuf::from("waterlogging_model.json"),
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            strict_validation: true,
            crop_set: CropSet::default(),
            override_min_rainfall_7d: 1.0,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            model_path: lookup("MODEL_PATH").map(PathBuf::from).unwrap_or(defaults.model_path),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or(defaults.cors_allowed_origins),
            strict_validation: lookup("STRICT_VALIDATION")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.strict_validation),
            crop_set: parsed(&lookup, "CROP_SET").unwrap_or(defaults.crop_set),
            override_min_rainfall_7d: parsed(&lookup, "OVERRIDE_MIN_RAINFALL_7D")
                .unwrap_or(defaults.override_min_rainfall_7d),
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.iter().any(|o| o == ANY_ORIGIN)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn split_origins(v: &str) -> Vec<String> {
    v.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
