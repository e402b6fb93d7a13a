//! Threat-weighted target selection.

use super::combatant::Combatant;
use crate::core::rng::RngContext;

/// Pick a target index by threat weight.
///
/// Only targetable candidates with a positive weight take part. Returns
/// `None` without drawing when none qualify; otherwise consumes exactly one
/// `next_double`.
pub fn select_target<C: Combatant>(rng: &mut RngContext, candidates: &[C]) -> Option<usize> {
    let weighted: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.can_be_targeted() && c.threat_weight() > 0.0)
        .map(|(index, c)| (index, c.threat_weight()))
        .collect();

    let total: f64 = weighted.iter().map(|(_, w)| w).sum();
    if weighted.is_empty() || !(total > 0.0) {
        return None;
    }

    let roll = rng.next_double() * total;
    let mut cumulative = 0.0;
    for &(index, weight) in &weighted {
        cumulative += weight;
        if roll < cumulative {
            return Some(index);
        }
    }
    // Float rounding can leave roll == total
    weighted.last().map(|&(index, _)| index)
}
