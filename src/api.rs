use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::classify::{ClassificationResult, Prediction};
use crate::config::ClassifierConfig;
use crate::error::ClassifyError;
use crate::history::{History, HistoryEntry};
use crate::metrics;
use crate::recognizer::{classify_image, RecognizerLoader};
use crate::reload::ClassifierHandle;
use crate::taxonomy::KeywordGroup;

#[derive(Clone)]
pub struct AppState {
    pub classifier: ClassifierHandle,
    pub history: Arc<History>,
    /// Image recognizer for `/classify/image`; `None` answers 503.
    pub recognizer: Option<Arc<RecognizerLoader>>,
}

impl AppState {
    pub fn new(classifier: ClassifierHandle) -> Self {
        Self {
            classifier,
            history: Arc::new(History::with_capacity(2000)),
            recognizer: None,
        }
    }

    pub fn with_recognizer(mut self, loader: RecognizerLoader) -> Self {
        self.recognizer = Some(Arc::new(loader));
        self
    }

    /// Build from a loaded config; fails on an invalid one.
    pub fn from_config(cfg: &ClassifierConfig) -> Result<Self, ClassifyError> {
        let classifier = crate::classify::Classifier::from_config(cfg)?;
        Ok(Self::new(ClassifierHandle::new(classifier)))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ClassifierHandle::default())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/classify", post(classify))
        .route("/classify/image", post(classify_image_bytes))
        .route("/taxonomy", get(taxonomy))
        .route("/debug/history", get(debug_history))
        .route("/debug/last-classification", get(debug_last_classification))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ClassifyReq {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Serialize)]
struct ClassifyResp {
    #[serde(flatten)]
    result: ClassificationResult,
    tip: &'static str,
}

struct ApiError(ClassifyError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ClassifyError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ClassifyError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ClassifyError::RecognizerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ClassifyError::RecognizerFailed(_) => StatusCode::BAD_GATEWAY,
        };
        let body = serde_json::json!({ "error": self.0.to_string(), "code": self.0.code() });
        (status, Json(body)).into_response()
    }
}

async fn classify(
    State(state): State<AppState>,
    Json(body): Json<ClassifyReq>,
) -> Result<Json<ClassifyResp>, ApiError> {
    let n = body.predictions.len();
    let outcome = state.classifier.classify(&body.predictions);
    respond(&state, outcome, n, "classify")
}

/// Raw image bytes in, verdict out, via the configured recognizer.
async fn classify_image_bytes(
    State(state): State<AppState>,
    image: Bytes,
) -> Result<Json<ClassifyResp>, ApiError> {
    let Some(loader) = state.recognizer.clone() else {
        let e = ClassifyError::RecognizerUnavailable("no recognizer configured".into());
        return respond(&state, Err(e), 0, "classify_image");
    };
    let classifier = state.classifier.current();
    match classify_image(&loader, &classifier, &image).await {
        Ok(out) => respond(&state, Ok(out.result), out.predictions.len(), "classify_image"),
        Err(e) => respond(&state, Err(e), 0, "classify_image"),
    }
}

fn respond(
    state: &AppState,
    outcome: Result<ClassificationResult, ClassifyError>,
    n: usize,
    route: &'static str,
) -> Result<Json<ClassifyResp>, ApiError> {
    match outcome {
        Ok(result) => {
            metrics::record_classification(&result);
            state.history.push(&result, n);
            info!(
                route,
                label = %result.label,
                sub_type = %result.sub_type,
                confidence = result.confidence,
                "classify"
            );
            Ok(Json(ClassifyResp {
                tip: result.label.disposal_tip(),
                result,
            }))
        }
        Err(e) => {
            metrics::record_error(&e);
            warn!(route, error = %e, "classify rejected");
            Err(ApiError(e))
        }
    }
}

async fn taxonomy(State(state): State<AppState>) -> Json<Vec<KeywordGroup>> {
    Json(state.classifier.current().taxonomy().groups().to_vec())
}

async fn debug_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(10))
}

async fn debug_last_classification(State(state): State<AppState>) -> Json<Option<HistoryEntry>> {
    Json(state.history.snapshot_last_n(1).pop())
}
