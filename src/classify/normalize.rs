//! Turns raw category scores into a percentage distribution.

use super::scoring::CategoryScore;
use super::CategoryConfidence;

/// Round to one decimal place, half away from zero (half-up for the
/// non-negative values used here).
#[inline]
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Sort descending by confidence; equal confidences keep category priority.
pub fn sort_ranked(entries: &mut [CategoryConfidence]) {
    entries.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.label.priority().cmp(&b.label.priority()))
    });
}

/// Percentages with one decimal, one entry per category, ranked.
/// A zero total is treated as 1 so every category comes out at 0.0.
pub fn normalize(scores: &CategoryScore) -> Vec<CategoryConfidence> {
    let total = match scores.total() {
        t if t == 0.0 => 1.0,
        t => t,
    };

    let mut out: Vec<CategoryConfidence> = scores
        .iter()
        .map(|(label, score)| CategoryConfidence {
            label,
            confidence: (score / total * 1000.0).round() / 10.0,
        })
        .collect();

    sort_ranked(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn scores(b: f64, r: f64, n: f64) -> CategoryScore {
        let mut s = CategoryScore::default();
        s.add(Category::Biodegradable, b);
        s.add(Category::Recyclable, r);
        s.add(Category::NonBiodegradable, n);
        s
    }

    #[test]
    fn percentages_rank_descending() {
        let out = normalize(&scores(0.1, 0.6, 0.3));
        let labels: Vec<_> = out.iter().map(|e| e.label).collect();
        assert_eq!(
            labels,
            vec![Category::Recyclable, Category::NonBiodegradable, Category::Biodegradable]
        );
        assert_eq!(out[0].confidence, 60.0);
        assert_eq!(out[1].confidence, 30.0);
        assert_eq!(out[2].confidence, 10.0);
    }

    #[test]
    fn one_decimal_half_up() {
        // 1/3 -> 33.3, 2/3 -> 66.7
        let out = normalize(&scores(1.0, 2.0, 0.0));
        assert_eq!(out[0].confidence, 66.7);
        assert_eq!(out[1].confidence, 33.3);
        assert_eq!(out[2].confidence, 0.0);
        assert_eq!(round1(0.25), 0.3);
        assert_eq!(round1(12.34), 12.3);
    }

    #[test]
    fn ties_break_by_priority() {
        let out = normalize(&scores(1.0, 1.0, 1.0));
        let labels: Vec<_> = out.iter().map(|e| e.label).collect();
        assert_eq!(labels, Category::ALL.to_vec());

        let out = normalize(&scores(0.0, 0.5, 0.5));
        assert_eq!(out[0].label, Category::Recyclable);
        assert_eq!(out[1].label, Category::NonBiodegradable);
    }

    #[test]
    fn zero_total_gives_all_zero() {
        let out = normalize(&CategoryScore::default());
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|e| e.confidence == 0.0));
        assert_eq!(out[0].label, Category::Biodegradable);
    }
}
