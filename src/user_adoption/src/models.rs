//! Row types flowing through the adoption pipeline.
//!
//! Every type here is a derived, read-only artifact of one batch run:
//! - [`EngagementRecord`] — raw input row (`user_id`, `time_stamp`)
//! - [`DailyVisit`] — one per engagement record, truncated to a calendar date
//! - [`WindowedVisitCount`] — visits in the trailing window ending on `date`
//! - [`AdoptionRecord`] — first date a user reached the adoption threshold
//!
//! Dates serialize as `YYYY-MM-DD`.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque user identifier as found in the engagement log.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One row of the "engagement" input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementRecord {
    /// Who was active.
    pub user_id: UserId,
    /// When, as written in the source (parsed by [`crate::timestamp`]).
    pub time_stamp: String,
}

impl EngagementRecord {
    /// Convenience constructor, mostly for tests and fixtures.
    pub fn new(user_id: impl Into<UserId>, time_stamp: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            time_stamp: time_stamp.into(),
        }
    }
}

/// An engagement record truncated to its calendar date.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyVisit {
    /// Who was active.
    pub user_id: UserId,
    /// Calendar date of the activity.
    pub date: NaiveDate,
}

/// Number of visits a user made in `(date - window_days, date]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowedVisitCount {
    /// Who was active.
    pub user_id: UserId,
    /// Reference (last) day of the window.
    pub date: NaiveDate,
    /// Visits inside the window, the reference day included. Always >= 1.
    pub previous_week_visits: u32,
}

/// The first date on which a user reached the adoption threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionRecord {
    /// Adopted user.
    pub user_id: UserId,
    /// Adoption date.
    pub date: NaiveDate,
    /// Windowed count on the adoption date (>= threshold).
    pub previous_week_visits: u32,
}

impl From<&WindowedVisitCount> for AdoptionRecord {
    fn from(row: &WindowedVisitCount) -> Self {
        Self {
            user_id: row.user_id.clone(),
            date: row.date,
            previous_week_visits: row.previous_week_visits,
        }
    }
}
