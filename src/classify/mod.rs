// src/classify/mod.rs
//! Classification pipeline: aggregate -> normalize -> calibrate -> resolve sub-type.
//!
//! `Classifier` owns only immutable data (a shared taxonomy and copied
//! parameters), so one instance can serve any number of threads. Every call
//! builds its own score maps. The only non-pure step is calibration, which
//! takes its randomness from the caller via [`JitterSource`].

pub mod calibrate;
pub mod normalize;
pub mod scoring;
pub mod subtype;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::category::{Category, SubType};
use crate::config::{CalibrationParams, ClassifierConfig, ScoringParams};
use crate::error::ClassifyError;
use crate::taxonomy::Taxonomy;

pub use calibrate::{calibrate, FixedJitter, JitterSource, RandJitter};
pub use normalize::normalize;
pub use scoring::{aggregate, validate, CategoryScore, Prediction, SubTypeScore};
pub use subtype::resolve_sub_type;

/// One category with its percentage confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfidence {
    pub label: Category,
    pub confidence: f64,
}

/// Final verdict. `all_predictions` always holds the three categories ranked
/// best-first, and `label`/`confidence` mirror its first entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub label: Category,
    pub sub_type: SubType,
    pub confidence: f64,
    pub all_predictions: Vec<CategoryConfidence>,
    /// True when the confidence floor was enforced.
    #[serde(default)]
    pub calibrated: bool,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    taxonomy: Arc<Taxonomy>,
    scoring: ScoringParams,
    calibration: CalibrationParams,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            Taxonomy::builtin(),
            ScoringParams::default(),
            CalibrationParams::default(),
        )
    }
}

impl Classifier {
    pub fn new(taxonomy: Arc<Taxonomy>, scoring: ScoringParams, calibration: CalibrationParams) -> Self {
        Self {
            taxonomy,
            scoring,
            calibration,
        }
    }

    /// Validate the config and build a classifier from it.
    pub fn from_config(cfg: &ClassifierConfig) -> Result<Self, ClassifyError> {
        cfg.validate()?;
        Ok(Self::new(cfg.taxonomy(), cfg.scoring, cfg.calibration))
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn scoring(&self) -> &ScoringParams {
        &self.scoring
    }

    pub fn calibration(&self) -> &CalibrationParams {
        &self.calibration
    }

    /// Classify with the configured jitter: a fresh `StdRng` seeded from
    /// `calibration.seed` when set, the thread RNG otherwise.
    pub fn classify(&self, predictions: &[Prediction]) -> Result<ClassificationResult, ClassifyError> {
        match self.calibration.seed {
            Some(seed) => {
                self.classify_with(predictions, &mut RandJitter::new(StdRng::seed_from_u64(seed)))
            }
            None => self.classify_with(predictions, &mut RandJitter::new(rand::rng())),
        }
    }

    /// Classify with an explicit jitter source.
    pub fn classify_with(
        &self,
        predictions: &[Prediction],
        jitter: &mut dyn JitterSource,
    ) -> Result<ClassificationResult, ClassifyError> {
        validate(predictions)?;

        let (cat_scores, sub_scores) =
            aggregate(predictions, &self.taxonomy, self.scoring.unmatched_weight);
        let mut ranked = normalize(&cat_scores);
        let calibrated = calibrate(&mut ranked, &self.calibration, jitter);

        let winner = ranked[0];
        let sub_type = resolve_sub_type(winner.label, &sub_scores);

        debug!(
            target: "classifier",
            n = predictions.len(),
            label = %winner.label,
            %sub_type,
            confidence = winner.confidence,
            calibrated,
            "classified"
        );

        Ok(ClassificationResult {
            label: winner.label,
            sub_type,
            confidence: winner.confidence,
            all_predictions: ranked,
            calibrated,
        })
    }
}
