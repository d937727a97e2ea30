//! Adoption resolution: first date each user reaches the threshold.

use std::{
    collections::{BTreeMap, HashSet, btree_map::Entry},
    num::NonZeroU32,
};

use tracing::debug;

use crate::error::{AdoptionError, Result};
use crate::models::{AdoptionRecord, UserId, WindowedVisitCount};

/// Default minimum windowed count that marks adoption.
pub const DEFAULT_ADOPTION_THRESHOLD: NonZeroU32 = NonZeroU32::new(3).unwrap();

/// Pick, per user, the earliest counted row with `previous_week_visits >= threshold`.
///
/// - Users that never reach the threshold produce no record.
/// - Output is ordered by user id; input order does not matter.
/// - Pure and idempotent: the same table always yields the same records.
///
/// Errors:
/// - [`AdoptionError::Schema`] if a row has a zero count (every counted row
///   includes its own day) or a (user, date) pair appears twice.
pub fn resolve_adoption(
    counts: &[WindowedVisitCount],
    threshold: NonZeroU32,
) -> Result<Vec<AdoptionRecord>> {
    let mut seen: HashSet<(&UserId, chrono::NaiveDate)> = HashSet::with_capacity(counts.len());
    let mut first: BTreeMap<&UserId, &WindowedVisitCount> = BTreeMap::new();

    for (row, c) in counts.iter().enumerate() {
        if c.previous_week_visits == 0 {
            return Err(AdoptionError::schema(format!(
                "row {row}: previous_week_visits must be >= 1 for user {} on {}",
                c.user_id, c.date
            )));
        }
        if !seen.insert((&c.user_id, c.date)) {
            return Err(AdoptionError::schema(format!(
                "row {row}: duplicate counted row for user {} on {}",
                c.user_id, c.date
            )));
        }
        if c.previous_week_visits < threshold.get() {
            continue;
        }
        match first.entry(&c.user_id) {
            Entry::Vacant(e) => {
                e.insert(c);
            }
            Entry::Occupied(mut e) => {
                if c.date < e.get().date {
                    e.insert(c);
                }
            }
        }
    }

    debug!(
        counted_rows = counts.len(),
        threshold = threshold.get(),
        adopted_users = first.len(),
        "adoption resolved"
    );
    Ok(first.into_values().map(AdoptionRecord::from).collect())
}
