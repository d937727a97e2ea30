//! End-to-end batch run: normalize → count → resolve.
//!
//! ## What this does
//! - Truncates every engagement record to a daily visit ([`crate::normalize`]).
//! - Counts visits in the trailing window per (user, date) ([`crate::window`]).
//! - Keeps each user's first qualifying date ([`crate::resolve`]).
//!
//! ## Failure
//! Any stage error aborts the run and nothing is returned, since adoption
//! dates depend on each user's complete history. An empty input is a valid
//! boundary case: it logs a warning and yields an empty result.

use std::{collections::HashSet, fmt};

use tracing::{info, warn};

use crate::config::AdoptionConfig;
use crate::error::Result;
use crate::models::{AdoptionRecord, EngagementRecord, WindowedVisitCount};
use crate::normalize::normalize_engagement;
use crate::resolve::resolve_adoption;
use crate::window::{WindowSettings, count_windowed_visits};

/// Row counts gathered during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdoptionSummary {
    /// Engagement records consumed.
    pub engagement_rows: usize,
    /// Distinct users seen in the input.
    pub users: usize,
    /// Rows in the windowed count table.
    pub counted_rows: usize,
    /// Users with an adoption record.
    pub adopted_users: usize,
}

impl fmt::Display for AdoptionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = "Adoption run";
        writeln!(f, "{title}")?;
        writeln!(f, "{}", "-".repeat(title.len()))?;
        writeln!(f, "engagement rows  {}", self.engagement_rows)?;
        writeln!(f, "users            {}", self.users)?;
        writeln!(f, "counted rows     {}", self.counted_rows)?;
        write!(f, "adopted users    {}", self.adopted_users)
    }
}

/// Everything one run produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdoptionRun {
    /// Windowed visit counts, one per (user, date).
    pub visits: Vec<WindowedVisitCount>,
    /// First adoption date per adopted user.
    pub adoption: Vec<AdoptionRecord>,
    /// Row counts.
    pub summary: AdoptionSummary,
}

/// Windowed visit counts for every (user, date) in the engagement log.
pub fn previous_week_visits(
    records: &[EngagementRecord],
    settings: &WindowSettings,
) -> Result<Vec<WindowedVisitCount>> {
    let visits = normalize_engagement(records)?;
    Ok(count_windowed_visits(&visits, settings))
}

/// Compute the adoption table from raw engagement records.
pub fn calculate_adoption(
    records: &[EngagementRecord],
    cfg: &AdoptionConfig,
) -> Result<AdoptionRun> {
    if records.is_empty() {
        warn!("empty engagement input; adoption table will be empty");
        return Ok(AdoptionRun::default());
    }

    let counted = previous_week_visits(records, &cfg.window_settings())?;
    let adoption = resolve_adoption(&counted, cfg.adoption_threshold)?;

    let users = records
        .iter()
        .map(|r| &r.user_id)
        .collect::<HashSet<_>>()
        .len();
    let summary = AdoptionSummary {
        engagement_rows: records.len(),
        users,
        counted_rows: counted.len(),
        adopted_users: adoption.len(),
    };
    info!(
        engagement_rows = summary.engagement_rows,
        users = summary.users,
        counted_rows = summary.counted_rows,
        adopted_users = summary.adopted_users,
        window_days = cfg.window_days.get(),
        threshold = cfg.adoption_threshold.get(),
        "adoption computed"
    );

    Ok(AdoptionRun {
        visits: counted,
        adoption,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdoptionError;

    #[test]
    fn summary_report() {
        let recs = vec![
            EngagementRecord::new("1", "2014-01-01 09:00:00"),
            EngagementRecord::new("1", "2014-01-02 09:00:00"),
            EngagementRecord::new("1", "2014-01-03 09:00:00"),
            EngagementRecord::new("2", "2014-01-01 09:00:00"),
        ];
        let run = calculate_adoption(&recs, &AdoptionConfig::default()).unwrap();
        insta::assert_snapshot!(run.summary.to_string(), @r"
        Adoption run
        ------------
        engagement rows  4
        users            2
        counted rows     4
        adopted users    1
        ");
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let run = calculate_adoption(&[], &AdoptionConfig::default()).unwrap();
        assert!(run.adoption.is_empty());
        assert!(run.visits.is_empty());
        assert_eq!(run.summary, AdoptionSummary::default());
    }

    #[test]
    fn parse_failure_produces_no_output() {
        let recs = vec![
            EngagementRecord::new("1", "2014-01-01 09:00:00"),
            EngagementRecord::new("1", "nope"),
        ];
        let err = calculate_adoption(&recs, &AdoptionConfig::default()).unwrap_err();
        assert!(matches!(err, AdoptionError::Parse { row: 1, .. }));
    }
}
