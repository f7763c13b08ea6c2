// SPDX-License-Identifier: MIT

//! Segment model: a fixed, named stretch of route that multiple activities
//! may traverse. Immutable reference data once fetched, keyed by id.

use serde::{Deserialize, Serialize};

use crate::models::activity::LatLng;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: u64,
    pub name: String,
    /// Distance in meters
    pub distance: f64,
    /// Average grade in percent
    pub average_grade: f64,
    /// Maximum grade in percent
    pub maximum_grade: f64,
    /// Highest elevation in meters
    pub elevation_high: f64,
    /// Lowest elevation in meters
    pub elevation_low: f64,
    pub start_latlng: Option<LatLng>,
    pub end_latlng: Option<LatLng>,
    /// Encoded segment polyline, present on detail responses only
    pub polyline: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}
