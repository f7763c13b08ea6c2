// SPDX-License-Identifier: MIT

//! Paceline: synchronizes an athlete's Strava exercise history into a local
//! store and derives comparative analytics from the accumulated dataset —
//! similar-effort cohorts and per-segment performance history.
//!
//! The presentation layer talks to [`Engine`]; everything underneath
//! (token lifecycle, paginated ingestion, effort reconciliation, similarity
//! matching) lives in [`services`].

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

pub use error::{Error, Result};
pub use services::Engine;
