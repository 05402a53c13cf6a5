//! Image-recognition collaborator.
//!
//! The model itself is out of scope; this module only fixes the seam. A
//! recognizer turns image bytes into a ranked `(label, probability)` list and
//! is loaded at most once per process through [`RecognizerLoader`], whose
//! `get` is single-flight: concurrent first callers share one load, and a
//! failed load is not cached so the next call retries.
//!
//! The HTTP layer serves it on `POST /classify/image` when `AppState` carries
//! a loader.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::classify::{ClassificationResult, Classifier, Prediction};
use crate::error::ClassifyError;

#[async_trait]
pub trait ImageRecognizer: Send + Sync {
    /// Ranked predictions for one encoded image.
    async fn predict(&self, image: &[u8]) -> anyhow::Result<Vec<Prediction>>;
    /// Name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynRecognizer = Arc<dyn ImageRecognizer>;

type LoadFuture = Pin<Box<dyn Future<Output = anyhow::Result<DynRecognizer>> + Send>>;
type LoadFn = Box<dyn Fn() -> LoadFuture + Send + Sync>;

/// Memoizing factory for a recognizer.
pub struct RecognizerLoader {
    cell: OnceCell<DynRecognizer>,
    load: LoadFn,
}

impl RecognizerLoader {
    pub fn new<F, Fut>(load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<DynRecognizer>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            load: Box::new(move || -> LoadFuture { Box::pin(load()) }),
        }
    }

    /// Loader that is already initialized with `recognizer`.
    pub fn ready(recognizer: DynRecognizer) -> Self {
        let r = recognizer.clone();
        Self {
            cell: OnceCell::new_with(Some(recognizer)),
            load: Box::new(move || -> LoadFuture {
                let r = r.clone();
                Box::pin(async move { Ok(r) })
            }),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> anyhow::Result<DynRecognizer> {
        let r = self
            .cell
            .get_or_try_init(|| async {
                let out = (self.load)().await;
                match &out {
                    Ok(r) => info!(recognizer = r.name(), "recognizer loaded"),
                    Err(e) => warn!(error = %e, "recognizer load failed"),
                }
                out
            })
            .await?;
        Ok(r.clone())
    }
}

/// Recognizer returning a fixed list regardless of input.
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    predictions: Vec<Prediction>,
}

impl StaticRecognizer {
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self { predictions }
    }
}

#[async_trait]
impl ImageRecognizer for StaticRecognizer {
    async fn predict(&self, _image: &[u8]) -> anyhow::Result<Vec<Prediction>> {
        Ok(self.predictions.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Recognizer output together with the verdict built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageClassification {
    pub predictions: Vec<Prediction>,
    pub result: ClassificationResult,
}

/// Run the recognizer on `image`, then the classifier on its output.
pub async fn classify_image(
    loader: &RecognizerLoader,
    classifier: &Classifier,
    image: &[u8],
) -> Result<ImageClassification, ClassifyError> {
    let recognizer = loader
        .get()
        .await
        .map_err(|e| ClassifyError::RecognizerUnavailable(format!("{e:#}")))?;
    let predictions = recognizer
        .predict(image)
        .await
        .map_err(|e| ClassifyError::RecognizerFailed(format!("{}: {e:#}", recognizer.name())))?;
    let result = classifier.classify(&predictions)?;
    Ok(ImageClassification {
        predictions,
        result,
    })
}
