//! Confidence floor on the top-ranked category.
//!
//! When the winner's confidence is below `floor`, it is replaced by a value in
//! `[floor, ceiling)` drawn from an injected [`JitterSource`]; the remainder is
//! split between the other two in their previous ratio (`default_ratio` when
//! both were zero). The result is re-ranked so the first entry stays the max.
//!
//! Randomness never comes from a global: production passes a `RandJitter`,
//! tests pass a `FixedJitter` or a seeded `StdRng`.

use rand::Rng;

use super::normalize::{round1, sort_ranked};
use super::CategoryConfidence;
use crate::config::CalibrationParams;

/// Source of uniform samples in `[0, 1)`.
pub trait JitterSource {
    fn sample(&mut self) -> f64;
}

/// Adapter over any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandJitter<R>(R);

impl<R: Rng> RandJitter<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: Rng> JitterSource for RandJitter<R> {
    fn sample(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Always returns the same sample (clamped into `[0, 1)`).
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&mut self) -> f64 {
        if self.0.is_nan() {
            return 0.0;
        }
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Jittered top confidence in `[floor, ceiling)`, on the one-decimal grid.
///
/// The grid starts at the first tenth not below `floor`. When no tenth fits
/// (e.g. floor 35.07, ceiling 35.1) the floor itself is returned.
pub fn jittered_top(params: &CalibrationParams, jitter: &mut dyn JitterSource) -> f64 {
    let lo = first_tenth_at_or_above(params.floor);
    let hi = last_tenth_below(params.ceiling);
    if lo > hi {
        return params.floor;
    }
    let steps = hi - lo + 1.0;
    let step = (jitter.sample() * steps).floor().min(steps - 1.0).max(0.0);
    (lo + step) / 10.0
}

// Both helpers work in tenths and correct for `x * 10.0` landing one ulp off.
fn first_tenth_at_or_above(x: f64) -> f64 {
    let t = (x * 10.0).ceil();
    if (t - 1.0) / 10.0 >= x {
        t - 1.0
    } else {
        t
    }
}

fn last_tenth_below(x: f64) -> f64 {
    let mut t = (x * 10.0).ceil() - 1.0;
    if t / 10.0 >= x {
        t -= 1.0;
    }
    if (t + 1.0) / 10.0 < x {
        t += 1.0;
    }
    t
}

/// Apply the floor. Returns `true` if an adjustment happened.
pub fn calibrate(
    ranked: &mut [CategoryConfidence],
    params: &CalibrationParams,
    jitter: &mut dyn JitterSource,
) -> bool {
    if ranked.len() != 3 || ranked[0].confidence >= params.floor {
        return false;
    }

    let new_top = jittered_top(params, jitter);
    let remaining = 100.0 - new_top;
    let denom = ranked[1].confidence + ranked[2].confidence;
    let ratio = if denom == 0.0 {
        params.default_ratio
    } else {
        ranked[1].confidence / denom
    };

    ranked[0].confidence = new_top;
    ranked[1].confidence = round1(remaining * ratio);
    ranked[2].confidence = round1(remaining * (1.0 - ratio));

    sort_ranked(ranked);
    true
}
