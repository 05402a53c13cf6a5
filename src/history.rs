//! history.rs: bounded in-memory log of recent classifications for /debug.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

use crate::category::{Category, SubType};
use crate::classify::ClassificationResult;

const MAX_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub label: Category,
    pub sub_type: SubType,
    pub confidence: f64,
    pub calibrated: bool,
    pub predictions: usize,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.min(MAX_CAPACITY);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    /// Record a result; `predictions` is the size of the input list.
    pub fn push(&self, r: &ClassificationResult, predictions: usize) {
        let entry = HistoryEntry {
            at: Utc::now(),
            label: r.label,
            sub_type: r.sub_type,
            confidence: r.confidence,
            calibrated: r.calibrated,
            predictions,
        };

        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    /// Oldest-first slice of the last `n` entries.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classifier, FixedJitter, Prediction};

    fn result(label: &str) -> ClassificationResult {
        Classifier::default()
            .classify_with(&[Prediction::new(label, 1.0)], &mut FixedJitter(0.0))
            .unwrap()
    }

    #[test]
    fn keeps_only_the_newest_entries() {
        let h = History::with_capacity(2);
        h.push(&result("banana"), 1);
        h.push(&result("wine bottle"), 1);
        h.push(&result("laptop"), 1);

        assert_eq!(h.len(), 2);
        let last = h.snapshot_last_n(10);
        assert_eq!(last[0].label, Category::Recyclable);
        assert_eq!(last[1].label, Category::NonBiodegradable);
        assert_eq!(last[1].sub_type, SubType::Electronic);
    }

    #[test]
    fn capacity_is_capped() {
        let h = History::with_capacity(usize::MAX);
        assert_eq!(h.cap, MAX_CAPACITY);
        assert!(h.is_empty());
    }
}
