//! Key-entity deduplication
//!
//! When one candidate is contained in another, only the better ranked one
//! survives. Decisions are taken over an immutable snapshot of the working
//! set, shortest candidates first, and survivors are materialized at the end
//! in working-set order.

use super::keyentity::{KeyEntityId, KeyEntityRegistry};
use crate::errors::Result;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// Remove candidates dominated by a containing or contained candidate
///
/// Pairs are visited shortest first; a candidate already removed takes no
/// further part. On a tie both candidates are kept.
pub fn deduplicate(
    registry: &KeyEntityRegistry,
    working: &[KeyEntityId],
) -> Result<Vec<KeyEntityId>> {
    let mut sorted: Vec<KeyEntityId> = working.to_vec();
    sorted.sort_by_key(|&id| registry.get(id).len());

    let mut removed: FxHashSet<KeyEntityId> = FxHashSet::default();

    for (i, &one_id) in sorted.iter().enumerate() {
        for &two_id in &sorted[i + 1..] {
            if removed.contains(&one_id) || removed.contains(&two_id) {
                continue;
            }

            let one = registry.get(one_id);
            let two = registry.get(two_id);
            if !one.is_duplicate(two) {
                continue;
            }

            match one.rank_against(two)? {
                Ordering::Greater => {
                    tracing::debug!(kept = one.text(), dropped = two.text(), "duplicate");
                    removed.insert(two_id);
                }
                Ordering::Less => {
                    tracing::debug!(kept = two.text(), dropped = one.text(), "duplicate");
                    removed.insert(one_id);
                }
                Ordering::Equal => {
                    tracing::trace!(left = one.text(), right = two.text(), "duplicate tie");
                }
            }
        }
    }

    Ok(working
        .iter()
        .copied()
        .filter(|id| !removed.contains(id))
        .collect())
}
