//! Trailing-window visit counting.
//!
//! For every (user, date) that has at least one [`DailyVisit`], count the
//! visits of the same user whose date falls in `(date - window_days, date]`:
//! open below, closed above. With a 7-day window, a visit exactly 7 days
//! before the reference date is out and one 6 days before is in.
//!
//! ## How
//! Visits are grouped per user and each user's dates are sorted once. A
//! two-pointer sweep then walks the distinct dates in order: `hi` moves past
//! every visit on the current day, `lo` moves past every visit at or below the
//! window floor, and the count is `hi - lo`. Each user costs O(n log n) for the
//! sort plus O(n) for the sweep, so there is no per-pair join.
//!
//! ## Counting mode
//! By default every engagement event counts, so two logins on the same day
//! contribute 2. [`CountMode::DistinctDays`] collapses same-day visits first.

use std::{collections::BTreeMap, fmt, num::NonZeroU32, str::FromStr};

use anyhow::bail;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{DailyVisit, UserId, WindowedVisitCount};

/// Default trailing window width, in days.
pub const DEFAULT_WINDOW_DAYS: NonZeroU32 = NonZeroU32::new(7).unwrap();

/// What a single unit in the windowed count represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Every engagement event counts, same-day repeats included.
    #[default]
    Events,
    /// Each active calendar day counts once.
    DistinctDays,
}

impl fmt::Display for CountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Events => "events",
            Self::DistinctDays => "distinct_days",
        })
    }
}

impl FromStr for CountMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "events" => Ok(Self::Events),
            "distinct_days" | "distinct-days" => Ok(Self::DistinctDays),
            other => bail!("unknown count mode: {other}"),
        }
    }
}

/// Settings consumed by [`count_windowed_visits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSettings {
    /// Width of the trailing window in days.
    pub window_days: NonZeroU32,
    /// Event or distinct-day counting.
    pub count_mode: CountMode,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            count_mode: CountMode::Events,
        }
    }
}

/// Count visits in the trailing window for every (user, date) present.
///
/// Output holds one row per distinct (user, date), ordered by user then date.
/// Every count is at least 1 because the window includes its reference day.
pub fn count_windowed_visits(
    visits: &[DailyVisit],
    settings: &WindowSettings,
) -> Vec<WindowedVisitCount> {
    let mut by_user: BTreeMap<&UserId, Vec<NaiveDate>> = BTreeMap::new();
    for v in visits {
        by_user.entry(&v.user_id).or_default().push(v.date);
    }

    let mut out = Vec::with_capacity(visits.len());
    for (user, mut dates) in by_user {
        dates.sort_unstable();
        if settings.count_mode == CountMode::DistinctDays {
            dates.dedup();
        }
        sweep_user(user, &dates, settings.window_days, &mut out);
    }

    debug!(
        visits = visits.len(),
        counted_rows = out.len(),
        window_days = settings.window_days.get(),
        count_mode = %settings.count_mode,
        "windowed visit counts computed"
    );
    out
}

/// Two-pointer sweep over one user's sorted dates.
fn sweep_user(
    user: &UserId,
    dates: &[NaiveDate],
    window_days: NonZeroU32,
    out: &mut Vec<WindowedVisitCount>,
) {
    let span = Days::new(u64::from(window_days.get()));
    let mut lo = 0;
    let mut hi = 0;

    while hi < dates.len() {
        let day = dates[hi];
        while hi < dates.len() && dates[hi] == day {
            hi += 1;
        }
        // floor is excluded; a floor below the calendar range excludes nothing
        if let Some(floor) = day.checked_sub_days(span) {
            // dates[hi - 1] == day > floor, so lo stays below hi
            while dates[lo] <= floor {
                lo += 1;
            }
        }
        out.push(WindowedVisitCount {
            user_id: user.clone(),
            date: day,
            previous_week_visits: u32::try_from(hi - lo).unwrap_or(u32::MAX),
        });
    }
}
