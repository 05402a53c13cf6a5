// src/lib.rs
// Public library surface for the service binary and integration tests.

pub mod api;
pub mod category;
pub mod classify;
pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod recognizer;
pub mod reload;
pub mod taxonomy;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::category::{Category, SubType};
pub use crate::classify::{
    CategoryConfidence, ClassificationResult, Classifier, FixedJitter, JitterSource, Prediction,
    RandJitter,
};
pub use crate::config::ClassifierConfig;
pub use crate::error::ClassifyError;
pub use crate::taxonomy::{KeywordGroup, Taxonomy};

/// Load config (file + env), build the classifier and return the full router,
/// hot reload included when enabled.
pub fn app() -> anyhow::Result<axum::Router> {
    let cfg = ClassifierConfig::load()?;
    let state = AppState::from_config(&cfg)?;

    let path = std::env::var(config::ENV_CONFIG_PATH)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from(config::DEFAULT_CONFIG_PATH));
    reload::start_hot_reload_thread(state.classifier.clone(), path);

    Ok(router(state))
}
