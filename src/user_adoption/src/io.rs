//! Flat-file collaborators: CSV tables in and out via Polars.
//!
//! Input columns are always read as text so identifiers keep their exact
//! spelling (leading zeros, mixed types, surrounding spaces) and parsing stays
//! with [`crate::timestamp`]. Cells are never trimmed here: `user_id` is
//! opaque, and the date/count parsers trim their own input. Extra columns are
//! ignored.
//!
//! Tables:
//! - engagement: `user_id`, `time_stamp`
//! - visits / adoption: `user_id`, `date` (`YYYY-MM-DD`), `previous_week_visits`

use std::{fs::File, path::Path};

use polars::prelude::*;
use tracing::debug;

use crate::error::{AdoptionError, Result};
use crate::models::{AdoptionRecord, EngagementRecord, UserId, WindowedVisitCount};
use crate::timestamp::parse_date;

/// Column holding the user identifier in every table.
pub const COL_USER_ID: &str = "user_id";
/// Raw timestamp column of the engagement table.
pub const COL_TIME_STAMP: &str = "time_stamp";
/// Calendar date column of the counted and adoption tables.
pub const COL_DATE: &str = "date";
/// Windowed count column of the counted and adoption tables.
pub const COL_PREVIOUS_WEEK_VISITS: &str = "previous_week_visits";

/// Read a headed CSV file with every column typed as text.
pub fn read_csv_as_text(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!(path = %path.display(), rows = df.height(), "csv loaded");
    Ok(df)
}

/// Load the engagement table from a CSV file.
pub fn read_engagement_csv(path: &Path) -> Result<Vec<EngagementRecord>> {
    engagement_from_frame(&read_csv_as_text(path)?)
}

/// Convert a dataframe into engagement records.
///
/// Errors:
/// - [`AdoptionError::Schema`] for a missing `user_id`/`time_stamp` column or a null cell
pub fn engagement_from_frame(df: &DataFrame) -> Result<Vec<EngagementRecord>> {
    let users = text_column(df, COL_USER_ID)?;
    let stamps = text_column(df, COL_TIME_STAMP)?;
    Ok(users
        .into_iter()
        .zip(stamps)
        .map(|(u, t)| EngagementRecord {
            user_id: UserId::new(u),
            time_stamp: t,
        })
        .collect())
}

/// Load a previously exported windowed count table from a CSV file.
pub fn read_visit_counts_csv(path: &Path) -> Result<Vec<WindowedVisitCount>> {
    visit_counts_from_frame(&read_csv_as_text(path)?)
}

/// Convert a dataframe into windowed count rows.
///
/// Errors:
/// - [`AdoptionError::Schema`] for a missing column, a null cell, or a count
///   that is not a non-negative integer
/// - [`AdoptionError::Parse`] for a `date` that is not `YYYY-MM-DD`
pub fn visit_counts_from_frame(df: &DataFrame) -> Result<Vec<WindowedVisitCount>> {
    let users = text_column(df, COL_USER_ID)?;
    let dates = text_column(df, COL_DATE)?;
    let counts = text_column(df, COL_PREVIOUS_WEEK_VISITS)?;

    let mut out = Vec::with_capacity(users.len());
    for (row, ((u, d), c)) in users.into_iter().zip(dates).zip(counts).enumerate() {
        let date = parse_date(&d).map_err(|_| AdoptionError::Parse { row, value: d.clone() })?;
        let previous_week_visits = c.trim().parse::<u32>().map_err(|_| {
            AdoptionError::schema(format!(
                "row {row}: `{COL_PREVIOUS_WEEK_VISITS}` is not an integer: {c:?}"
            ))
        })?;
        out.push(WindowedVisitCount {
            user_id: UserId::new(u),
            date,
            previous_week_visits,
        });
    }
    Ok(out)
}

/// Build the "visits" dataframe (`user_id`, `date`, `previous_week_visits`).
pub fn visit_counts_frame(rows: &[WindowedVisitCount]) -> Result<DataFrame> {
    let df = df!(
        COL_USER_ID => rows.iter().map(|r| r.user_id.as_str()).collect::<Vec<_>>(),
        COL_DATE => rows.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect::<Vec<_>>(),
        COL_PREVIOUS_WEEK_VISITS => rows.iter().map(|r| r.previous_week_visits).collect::<Vec<u32>>()
    )?;
    Ok(df)
}

/// Build the "adoption" dataframe (`user_id`, `date`, `previous_week_visits`).
pub fn adoption_frame(records: &[AdoptionRecord]) -> Result<DataFrame> {
    let df = df!(
        COL_USER_ID => records.iter().map(|r| r.user_id.as_str()).collect::<Vec<_>>(),
        COL_DATE => records.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect::<Vec<_>>(),
        COL_PREVIOUS_WEEK_VISITS => records.iter().map(|r| r.previous_week_visits).collect::<Vec<u32>>()
    )?;
    Ok(df)
}

/// Write a dataframe as a headed CSV file, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "csv written");
    Ok(())
}

/// Extract a non-null text column, cells as written.
fn text_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| AdoptionError::schema(format!("missing column `{name}`")))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    let ca = series.str()?;

    ca.into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(str::to_string)
                .ok_or_else(|| AdoptionError::schema(format!("row {row}: null `{name}`")))
        })
        .collect()
}
