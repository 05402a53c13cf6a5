use axum::{routing::get, Router};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::classify::ClassificationResult;
use crate::error::ClassifyError;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already set.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

// Without an installed recorder these are no-ops.

pub fn record_classification(r: &ClassificationResult) {
    counter!("waste_classifications_total", "category" => r.label.display_name()).increment(1);
    histogram!("waste_classification_confidence").record(r.confidence);
    if r.calibrated {
        counter!("waste_calibrations_total").increment(1);
    }
}

pub fn record_error(e: &ClassifyError) {
    counter!("waste_classify_errors_total", "code" => e.code()).increment(1);
}
