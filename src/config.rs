// src/config.rs
//! Classifier configuration: tunable constants + optional taxonomy override.
//!
//! Loaded from TOML (`WASTE_CONFIG_PATH` or `config/classifier.toml`). A
//! missing file means "use defaults". Selected values can be overridden from
//! the environment; unparsable env values are ignored.
//!
//! ```toml
//! [scoring]
//! unmatched_weight = 0.3
//!
//! [calibration]
//! floor = 35.0
//! ceiling = 45.0
//! default_ratio = 0.6
//! seed = 42            # optional
//!
//! [[groups]]           # optional, replaces the built-in taxonomy
//! category = "Recyclable"
//! sub_type = "Glass"
//! keywords = ["wine bottle"]
//! ```

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::error::ClassifyError;
use crate::taxonomy::{KeywordGroup, Taxonomy};

// --- env defaults & names ---
pub const DEFAULT_CONFIG_PATH: &str = "config/classifier.toml";
pub const ENV_CONFIG_PATH: &str = "WASTE_CONFIG_PATH";
pub const ENV_UNMATCHED_WEIGHT: &str = "WASTE_UNMATCHED_WEIGHT";
pub const ENV_CONFIDENCE_FLOOR: &str = "WASTE_CONFIDENCE_FLOOR";
pub const ENV_JITTER_SEED: &str = "WASTE_JITTER_SEED";

// Empirical values; kept for compatibility, not derived.
pub const DEFAULT_UNMATCHED_WEIGHT: f64 = 0.3;
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 35.0;
pub const DEFAULT_JITTER_CEILING: f64 = 45.0;
pub const DEFAULT_SPLIT_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// Weight applied to predictions that match no taxonomy group.
    pub unmatched_weight: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            unmatched_weight: DEFAULT_UNMATCHED_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParams {
    /// Minimum confidence the winner must reach before it is forced up.
    pub floor: f64,
    /// Exclusive upper bound of the forced value.
    pub ceiling: f64,
    /// Share of the remainder given to the runner-up when both others are 0.
    pub default_ratio: f64,
    /// Fixes the jitter for every call when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            floor: DEFAULT_CONFIDENCE_FLOOR,
            ceiling: DEFAULT_JITTER_CEILING,
            default_ratio: DEFAULT_SPLIT_RATIO,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub scoring: ScoringParams,
    #[serde(default)]
    pub calibration: CalibrationParams,
    #[serde(default)]
    pub groups: Vec<KeywordGroup>,
}

impl ClassifierConfig {
    /// Resolve path from env, read the file if present, apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = match Self::load_from_path(&path) {
            Ok(cfg) => {
                info!(path = %path.display(), "classifier config loaded");
                cfg
            }
            Err(e) if is_not_found(&e) => {
                info!(path = %path.display(), "no classifier config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };

        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read classifier config at {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid classifier config at {}", path.display()))
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let cfg: ClassifierConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Env values win over file values. Out-of-range values are left for
    /// `validate` to reject.
    pub fn apply_env_overrides(&mut self) {
        if let Some(w) = parse_f64_env(std::env::var(ENV_UNMATCHED_WEIGHT).ok()) {
            self.scoring.unmatched_weight = w;
        }
        if let Some(f) = parse_f64_env(std::env::var(ENV_CONFIDENCE_FLOOR).ok()) {
            self.calibration.floor = f;
        }
        if let Some(seed) = std::env::var(ENV_JITTER_SEED)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.calibration.seed = Some(seed);
        }
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        let w = self.scoring.unmatched_weight;
        if !w.is_finite() || w < 0.0 {
            return Err(ClassifyError::InvalidConfig(format!(
                "scoring.unmatched_weight must be a finite value >= 0 (got {w})"
            )));
        }

        let CalibrationParams {
            floor,
            ceiling,
            default_ratio,
            ..
        } = self.calibration;
        if !(floor.is_finite() && ceiling.is_finite()) || floor < 0.0 || ceiling > 100.0 || floor >= ceiling {
            return Err(ClassifyError::InvalidConfig(format!(
                "calibration requires 0 <= floor < ceiling <= 100 (got floor={floor}, ceiling={ceiling})"
            )));
        }
        if !(0.0..=1.0).contains(&default_ratio) {
            return Err(ClassifyError::InvalidConfig(format!(
                "calibration.default_ratio must be within 0..=1 (got {default_ratio})"
            )));
        }
        Ok(())
    }

    /// Taxonomy from `[[groups]]` when given, otherwise the built-in one.
    pub fn taxonomy(&self) -> Arc<Taxonomy> {
        if self.groups.is_empty() {
            Taxonomy::builtin()
        } else {
            Arc::new(Taxonomy::new(self.groups.clone()))
        }
    }
}

fn parse_f64_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.chain()
        .filter_map(|c| c.downcast_ref::<io::Error>())
        .any(|io| io.kind() == io::ErrorKind::NotFound)
}
