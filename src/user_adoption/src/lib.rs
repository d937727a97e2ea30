//! User adoption from engagement logs.
//!
//! A user counts as *adopted* on the first date on which they were active at
//! least `adoption_threshold` times within a trailing `window_days` window.
//! The crate is organised as a linear batch pipeline:
//!
//! - [`normalize`]: raw engagement rows → one [`models::DailyVisit`] per row
//! - [`window`]: daily visits → [`models::WindowedVisitCount`] per (user, date)
//! - [`resolve`]: counted table → at most one [`models::AdoptionRecord`] per user
//! - [`pipeline`]: runs the stages with an explicit [`config::AdoptionConfig`]
//!
//! Flat-file loading and writing live in [`io`].

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod timestamp;
pub mod window;

pub use error::{AdoptionError, Result};
