// SPDX-License-Identifier: MIT

//! Service layer: API client, token lifecycle, sync, and analytics.

pub mod engine;
pub mod pagination;
pub mod segment;
pub mod similar;
pub mod strava;
pub mod sync;
pub mod token;

pub use engine::Engine;
pub use segment::{SegmentHistory, SegmentService};
pub use similar::SimilarityService;
pub use strava::{Athlete, StravaApi, StravaClient, TokenResponse};
pub use sync::SyncService;
pub use token::TokenManager;
