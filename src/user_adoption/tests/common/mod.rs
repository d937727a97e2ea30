#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use tempfile::TempDir;
use user_adoption::models::EngagementRecord;

/// Day 1 of every scenario.
pub fn day(n: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2014, 4, 1).unwrap() + Days::new(n - 1)
}

/// One engagement record on scenario day `n` at 09:15.
pub fn visit(user: &str, n: u64) -> EngagementRecord {
    EngagementRecord::new(user, format!("{} 09:15:00", day(n).format("%Y-%m-%d")))
}

/// One record per listed day.
pub fn visits(user: &str, days: &[u64]) -> Vec<EngagementRecord> {
    days.iter().map(|n| visit(user, *n)).collect()
}

pub struct Workspace {
    _dir: TempDir, // keep alive for the life of the test
    pub root: PathBuf,
}

impl Workspace {
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

pub fn workspace() -> Workspace {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path().to_path_buf();
    Workspace { _dir: dir, root }
}

/// Write an engagement CSV the way the upstream export looks.
pub fn write_engagement_csv(ws: &Workspace, name: &str, rows: &[(&str, &str)]) -> PathBuf {
    let mut body = String::from("time_stamp,user_id,visited\n");
    for (ts, user) in rows {
        body.push_str(&format!("{ts},{user},1\n"));
    }
    let path = ws.path(name);
    std::fs::write(&path, body).expect("write csv");
    path
}
