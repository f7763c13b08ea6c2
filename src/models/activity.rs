// SPDX-License-Identifier: MIT

//! Activity and segment-effort models for storage and matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::segment::Segment;
use crate::time_utils;

/// A coordinate as `[latitude, longitude]`, matching Strava's wire order.
pub type LatLng = [f64; 2];

/// Stored activity record.
///
/// `id` is the dedup and merge key across sync passes: a later fetch of the
/// same id replaces the earlier record in full, never field-by-field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID (also used as store key)
    pub id: u64,
    /// Activity name/title
    pub name: String,
    /// Sport type (Ride, Run, Hike, etc.)
    pub sport_type: String,
    /// Start date/time (RFC 3339)
    pub start_date: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: u32,
    /// Elapsed time in seconds
    pub elapsed_time: u32,
    /// Total elevation gain in meters
    pub total_elevation_gain: f64,
    /// Average speed in meters per second
    pub average_speed: f64,
    /// Max speed in meters per second
    pub max_speed: f64,
    /// Average heart rate, if recorded
    pub average_heartrate: Option<f64>,
    /// Start coordinate, if the activity has GPS data
    pub start_latlng: Option<LatLng>,
    /// End coordinate, if the activity has GPS data
    pub end_latlng: Option<LatLng>,
    /// Encoded route polyline (precision 5)
    pub map_polyline: Option<String>,
    /// Segment efforts, present only after a detail fetch. The list endpoint
    /// omits them, so `None` doubles as the "detail still needed" signal.
    pub segment_efforts: Option<Vec<SegmentEffort>>,
}

impl Activity {
    /// Parsed start date, or `None` if the stored string is malformed.
    pub fn start_date_utc(&self) -> Option<DateTime<Utc>> {
        time_utils::parse_rfc3339(&self.start_date)
    }

    /// Whether a detail fetch has populated this record.
    pub fn has_detail(&self) -> bool {
        self.segment_efforts.is_some()
    }

    /// IDs of all segments this activity has efforts on.
    pub fn segment_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.segment_efforts
            .iter()
            .flatten()
            .map(|effort| effort.segment.id)
    }
}

/// One traversal of a segment during a specific activity.
///
/// Dedup key is the effort `id`: an effort embedded in a cached activity and
/// one fetched from the segment-efforts endpoint are duplicates iff their ids
/// match; no other equality heuristic is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentEffort {
    pub id: u64,
    pub segment: Segment,
    /// Elapsed time in seconds
    pub elapsed_time: u32,
    /// Moving time in seconds
    pub moving_time: u32,
    /// Start date/time (RFC 3339); backfilled from the parent activity when
    /// the effort record itself lacks one
    pub start_date: Option<String>,
    pub average_heartrate: Option<f64>,
}

impl SegmentEffort {
    pub fn start_date_utc(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .as_deref()
            .and_then(time_utils::parse_rfc3339)
    }
}
