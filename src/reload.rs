// src/reload.rs
/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use crate::classify::{ClassificationResult, Classifier, Prediction};
use crate::config::ClassifierConfig;
use crate::error::ClassifyError;

/// Cheap-to-clone handle shared by request handlers. The inner classifier is
/// immutable; a reload swaps in a whole new one.
#[derive(Clone)]
pub struct ClassifierHandle {
    inner: Arc<RwLock<Arc<Classifier>>>,
}

impl ClassifierHandle {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(classifier))),
        }
    }

    /// Snapshot of the current classifier. The lock is held only for the clone.
    pub fn current(&self) -> Arc<Classifier> {
        match self.inner.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn classify(&self, predictions: &[Prediction]) -> Result<ClassificationResult, ClassifyError> {
        self.current().classify(predictions)
    }

    pub fn replace(&self, classifier: Classifier) {
        let fresh = Arc::new(classifier);
        match self.inner.write() {
            Ok(mut g) => *g = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }
}

impl Default for ClassifierHandle {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}

/// Returns true if hot reload should run (dev/local only).
fn hot_reload_enabled() -> bool {
    let want = std::env::var("WASTE_HOT_RELOAD")
        .ok()
        .map(|v| v == "1")
        .unwrap_or(false);
    if !want {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Rebuild a classifier from `path` (plus env overrides).
pub fn reload_from(path: &std::path::Path) -> anyhow::Result<Classifier> {
    let mut cfg = ClassifierConfig::load_from_path(path)?;
    cfg.apply_env_overrides();
    Ok(Classifier::from_config(&cfg)?)
}

/// Poll `path` every 2s and swap a rebuilt classifier into `handle` when the
/// file's mtime moves forward. A bad file keeps the previous classifier.
pub fn start_hot_reload_thread(handle: ClassifierHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }
    info!(path = %path.display(), "classifier hot reload enabled");

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            if let Ok(mtime) = fs::metadata(&path).and_then(|m| m.modified()) {
                let changed = match last_mtime {
                    None => {
                        last_mtime = Some(mtime);
                        false
                    }
                    Some(prev) => mtime > prev,
                };
                if changed {
                    match reload_from(&path) {
                        Ok(c) => {
                            handle.replace(c);
                            info!(path = %path.display(), "classifier reloaded");
                        }
                        Err(e) => warn!(error = %e, "classifier reload failed; keeping previous"),
                    }
                    last_mtime = Some(mtime);
                }
            }
            thread::sleep(poll);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use std::io::Write;

    fn unique_tmp_dir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!("classifier_reload_{}", nanos));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn replace_swaps_classifier_for_new_snapshots() {
        let handle = ClassifierHandle::new(Classifier::default());
        let before = handle.current();

        let cfg = ClassifierConfig::from_toml_str(
            r#"
[[groups]]
category = "Biodegradable"
sub_type = "Organic"
keywords = ["wine bottle"]
"#,
        )
        .unwrap();
        handle.replace(Classifier::from_config(&cfg).unwrap());

        let preds = [Prediction::new("wine bottle", 1.0)];
        assert_eq!(before.classify(&preds).unwrap().label, Category::Recyclable);
        assert_eq!(handle.classify(&preds).unwrap().label, Category::Biodegradable);
    }

    #[test]
    fn reload_from_reads_file() {
        let dir = unique_tmp_dir();
        let path = dir.join("classifier.toml");
        {
            let mut f = fs::File::create(&path).unwrap();
            write!(f, "[scoring]\nunmatched_weight = 0.5\n").unwrap();
            f.sync_all().unwrap();
        }
        let c = reload_from(&path).expect("reload");
        assert_eq!(c.scoring().unmatched_weight, 0.5);

        {
            let mut f = fs::File::create(&path).unwrap();
            write!(f, "[calibration]\nfloor = 99.0\n").unwrap();
            f.sync_all().unwrap();
        }
        assert!(reload_from(&path).is_err());

        let _ = fs::remove_dir_all(&dir);
    }
}
