// SPDX-License-Identifier: MIT

//! Data models for activities, segments, and credentials.

pub mod activity;
pub mod credentials;
pub mod segment;

pub use activity::{Activity, LatLng, SegmentEffort};
pub use credentials::Credentials;
pub use segment::Segment;
