use super::scoring::SubTypeScore;
use crate::category::{Category, SubType};

/// Highest-scoring sub-type inside `winner`, or `SubType::General` when the
/// category received no positive sub-type credit. Equal scores keep the first
/// one in `SubType` declaration order.
pub fn resolve_sub_type(winner: Category, subs: &SubTypeScore) -> SubType {
    subs.for_category(winner)
        .filter(|(_, v)| *v > 0.0)
        .fold(None, |best: Option<(SubType, f64)>, (sub, v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((sub, v)),
        })
        .map(|(sub, _)| sub)
        .unwrap_or(SubType::General)
}
