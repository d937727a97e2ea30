//! Event normalization: engagement records → daily visits.

use tracing::debug;

use crate::error::{AdoptionError, Result};
use crate::models::{DailyVisit, EngagementRecord};
use crate::timestamp::truncate_to_date;

/// Truncate every engagement record to a [`DailyVisit`].
///
/// - Exactly one visit per record, in input order; same-day records are kept.
/// - The first unparseable timestamp aborts the whole batch with
///   [`AdoptionError::Parse`] carrying its zero-based row index.
pub fn normalize_engagement(records: &[EngagementRecord]) -> Result<Vec<DailyVisit>> {
    let mut visits = Vec::with_capacity(records.len());
    for (row, rec) in records.iter().enumerate() {
        let date = truncate_to_date(&rec.time_stamp).map_err(|e| {
            debug!(row, user_id = %rec.user_id, error = %e, "timestamp rejected");
            AdoptionError::Parse {
                row,
                value: rec.time_stamp.clone(),
            }
        })?;
        visits.push(DailyVisit {
            user_id: rec.user_id.clone(),
            date,
        });
    }
    Ok(visits)
}
