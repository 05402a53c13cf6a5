//! Waste classifier service: binary entrypoint.
//! Boots the Axum HTTP server with the classifier state and optional metrics.

use shuttle_axum::ShuttleAxum;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use waste_classifier::metrics::Metrics;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - WASTE_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("WASTE_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("classifier=debug,waste_classifier=info,warn"));

    // The host runtime may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let mut router = waste_classifier::app()?;

    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!(error = %e, "metrics disabled"),
    }

    Ok(router.into())
}
