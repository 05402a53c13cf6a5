//! Score aggregation over the raw prediction list.
//!
//! Matched predictions add their full probability to the category and to the
//! `(category, sub_type)` bucket. Unmatched predictions add a damped share
//! (`unmatched_weight * p`) to NonBiodegradable only and earn no sub-type
//! credit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::{Category, SubType};
use crate::error::ClassifyError;
use crate::taxonomy::Taxonomy;

/// One `(label, probability)` pair from the recognition model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Accumulated score per category. All three keys always present.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryScore([f64; 3]);

impl CategoryScore {
    #[inline]
    pub fn get(&self, c: Category) -> f64 {
        self.0[c.priority()]
    }

    #[inline]
    pub fn add(&mut self, c: Category, v: f64) {
        self.0[c.priority()] += v;
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// `(category, score)` in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

/// Accumulated score per `(category, sub_type)`; only buckets that received
/// credit are present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubTypeScore(BTreeMap<(Category, SubType), f64>);

impl SubTypeScore {
    pub fn add(&mut self, c: Category, s: SubType, v: f64) {
        *self.0.entry((c, s)).or_insert(0.0) += v;
    }

    pub fn get(&self, c: Category, s: SubType) -> f64 {
        self.0.get(&(c, s)).copied().unwrap_or(0.0)
    }

    /// Sub-type buckets of one category, in `SubType` declaration order.
    pub fn for_category(&self, c: Category) -> impl Iterator<Item = (SubType, f64)> + '_ {
        self.0
            .iter()
            .filter(move |((cat, _), _)| *cat == c)
            .map(|((_, sub), v)| (*sub, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reject probabilities outside `[0, 1]` (NaN included) before any scoring.
pub fn validate(predictions: &[Prediction]) -> Result<(), ClassifyError> {
    for (index, p) in predictions.iter().enumerate() {
        if !(0.0..=1.0).contains(&p.probability) {
            return Err(ClassifyError::InvalidInput {
                index,
                label: p.label.clone(),
                probability: p.probability,
            });
        }
    }
    Ok(())
}

/// Accumulate category and sub-type scores. Callers are expected to have run
/// [`validate`] first.
pub fn aggregate(
    predictions: &[Prediction],
    taxonomy: &Taxonomy,
    unmatched_weight: f64,
) -> (CategoryScore, SubTypeScore) {
    let mut cats = CategoryScore::default();
    let mut subs = SubTypeScore::default();

    for p in predictions {
        match taxonomy.match_label(&p.label) {
            Some((cat, sub)) => {
                cats.add(cat, p.probability);
                subs.add(cat, sub, p.probability);
            }
            None => cats.add(Category::NonBiodegradable, unmatched_weight * p.probability),
        }
    }

    (cats, subs)
}
