//! Run configuration: parsing, environment overrides, and path resolution.
//!
//! This module defines a TOML-backed configuration for one adoption run:
//! - The trailing window width (`window_days`, default 7)
//! - The adoption threshold (`adoption_threshold`, default 3)
//! - The counting mode (`count_mode`, default `events`)
//! - Optional flat-file locations under `[paths]`
//!
//! Every field has a default, so an empty document is a valid configuration.
//! Unknown keys are rejected.
//!
//! Precedence, lowest first: defaults, TOML file, environment
//! ([`ENV_WINDOW_DAYS`], [`ENV_THRESHOLD`], [`ENV_COUNT_MODE`]), CLI flags.
//!
//! Entrypoints:
//! - Parse from a TOML string: [`load_config_str`]
//! - Parse from a file path: [`load_config_path`]
//! - Layer environment overrides: [`AdoptionConfig::apply_env_overrides`]
//! - Full precedence chain for a run: [`layered_config`]

use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use shared_utils::env::env_override;

use crate::resolve::DEFAULT_ADOPTION_THRESHOLD;
use crate::window::{CountMode, DEFAULT_WINDOW_DAYS, WindowSettings};

/// Overrides [`AdoptionConfig::window_days`].
pub const ENV_WINDOW_DAYS: &str = "ADOPTION_WINDOW_DAYS";
/// Overrides [`AdoptionConfig::adoption_threshold`].
pub const ENV_THRESHOLD: &str = "ADOPTION_THRESHOLD";
/// Overrides [`AdoptionConfig::count_mode`].
pub const ENV_COUNT_MODE: &str = "ADOPTION_COUNT_MODE";

/// Configuration for one adoption run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdoptionConfig {
    /// Width of the trailing lookback window in days.
    pub window_days: NonZeroU32,
    /// Minimum windowed count that marks a user as adopted.
    pub adoption_threshold: NonZeroU32,
    /// Whether same-day repeats count individually.
    pub count_mode: CountMode,
    /// Flat-file locations used by the CLI.
    pub paths: PathsConfig,
}

impl Default for AdoptionConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            adoption_threshold: DEFAULT_ADOPTION_THRESHOLD,
            count_mode: CountMode::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl AdoptionConfig {
    /// The subset of settings the window counter needs.
    pub fn window_settings(&self) -> WindowSettings {
        WindowSettings {
            window_days: self.window_days,
            count_mode: self.count_mode,
        }
    }

    /// Layer `ADOPTION_*` environment variables over the current values.
    ///
    /// Unset or blank variables leave the field alone; an unparsable value
    /// (including `0` for the numeric ones) is an error.
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Some(v) = env_override::<NonZeroU32>(ENV_WINDOW_DAYS)? {
            self.window_days = v;
        }
        if let Some(v) = env_override::<NonZeroU32>(ENV_THRESHOLD)? {
            self.adoption_threshold = v;
        }
        if let Some(v) = env_override::<CountMode>(ENV_COUNT_MODE)? {
            self.count_mode = v;
        }
        Ok(())
    }

    /// Apply command-line values over the current ones.
    pub fn apply_flags(&mut self, flags: &FlagOverrides) {
        if let Some(w) = flags.window_days {
            self.window_days = w;
        }
        if let Some(t) = flags.adoption_threshold {
            self.adoption_threshold = t;
        }
        if flags.distinct_days {
            self.count_mode = CountMode::DistinctDays;
        }
    }
}

/// Values supplied on the command line; `None`/`false` means "not given".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    /// `--window-days`
    pub window_days: Option<NonZeroU32>,
    /// `--threshold`
    pub adoption_threshold: Option<NonZeroU32>,
    /// `--distinct-days`
    pub distinct_days: bool,
}

/// Build the configuration for one run: defaults, then the optional TOML file,
/// then `ADOPTION_*` environment variables, then command-line flags.
pub fn layered_config(
    file: Option<&Path>,
    flags: &FlagOverrides,
) -> anyhow::Result<AdoptionConfig> {
    let mut cfg = match file {
        Some(path) => load_config_path(path)?,
        None => AdoptionConfig::default(),
    };
    cfg.apply_env_overrides()?;
    cfg.apply_flags(flags);
    Ok(cfg)
}

/// Flat-file locations. Relative paths resolve against `base_dir`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory relative paths are joined onto (current directory when unset).
    pub base_dir: Option<PathBuf>,
    /// Engagement input table.
    pub engagement_csv: Option<PathBuf>,
    /// Adoption output table.
    pub adoption_csv: Option<PathBuf>,
    /// Optional export of the windowed count table.
    pub visits_csv: Option<PathBuf>,
}

impl PathsConfig {
    /// Join `p` onto `base_dir` unless it is already absolute.
    pub fn resolve(&self, p: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        }
    }

    /// Resolved engagement input path, if configured.
    pub fn engagement(&self) -> Option<PathBuf> {
        self.engagement_csv.as_deref().map(|p| self.resolve(p))
    }

    /// Resolved adoption output path, if configured.
    pub fn adoption(&self) -> Option<PathBuf> {
        self.adoption_csv.as_deref().map(|p| self.resolve(p))
    }

    /// Resolved visits export path, if configured.
    pub fn visits(&self) -> Option<PathBuf> {
        self.visits_csv.as_deref().map(|p| self.resolve(p))
    }

    /// `--input` when given (taken as-is), else `engagement_csv`.
    pub fn engagement_or(&self, flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        flag.or_else(|| self.engagement())
            .ok_or_else(|| anyhow!("no engagement input: pass --input or set paths.engagement_csv"))
    }

    /// `--output` when given (taken as-is), else `adoption_csv`.
    pub fn adoption_or(&self, flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        flag.or_else(|| self.adoption())
            .ok_or_else(|| anyhow!("no adoption output: pass --output or set paths.adoption_csv"))
    }

    /// Visits export destination: the flag when given, else `visits_csv`, else none.
    pub fn visits_or(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.visits())
    }
}

/// Parse a configuration from a TOML string.
///
/// Errors:
/// - TOML syntax errors, unknown keys, zero window or threshold
pub fn load_config_str(toml_str: &str) -> anyhow::Result<AdoptionConfig> {
    toml::from_str(toml_str).context("failed to parse adoption config TOML")
}

/// Read a configuration TOML file from disk and parse it.
///
/// See [`load_config_str`] for details on parsing.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<AdoptionConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
