// SPDX-License-Identifier: MIT

//! Similar-effort matching.
//!
//! Groups activities into a cohort comparable to a reference activity using
//! sport type, distance, elevation, and start-point tolerances, with an
//! optional refinement pass that requires a shared route segment. Matching is
//! pairwise against the reference only; cohorts are not transitive clusters.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use geo::{Distance, Haversine, Point};

use crate::db::ActivityStore;
use crate::error::Result;
use crate::models::{Activity, LatLng};
use crate::services::strava::StravaApi;
use crate::services::token::TokenManager;

/// Relative distance tolerance against the reference distance.
pub const DISTANCE_TOLERANCE: f64 = 0.05;

/// Relative elevation-gain tolerance against the reference gain.
pub const ELEVATION_TOLERANCE: f64 = 0.10;

/// Absolute elevation allowance so short or flat efforts are not
/// over-rejected by the relative tolerance.
pub const ELEVATION_FLOOR_METERS: f64 = 20.0;

/// Maximum start-point separation for two activities to share a route.
pub const START_POINT_RADIUS_METERS: f64 = 500.0;

/// Detail-fetch cap for the refinement prefetch batch.
pub const MAX_DETAIL_FETCHES: usize = 15;

/// Throttle between per-activity detail fetches.
const DETAIL_FETCH_DELAY: Duration = Duration::from_millis(400);

/// Whether `candidate` is comparable to `reference`.
///
/// Sport type matches exactly (case-sensitive, no normalization). When the
/// reference has a start point, a candidate without one is excluded outright:
/// partial data must not produce false positives.
pub fn is_base_match(reference: &Activity, candidate: &Activity) -> bool {
    if candidate.sport_type != reference.sport_type {
        return false;
    }

    if (candidate.distance - reference.distance).abs() > DISTANCE_TOLERANCE * reference.distance {
        return false;
    }

    let elevation_band =
        ELEVATION_FLOOR_METERS.max(ELEVATION_TOLERANCE * reference.total_elevation_gain);
    if (candidate.total_elevation_gain - reference.total_elevation_gain).abs() > elevation_band {
        return false;
    }

    if let Some(reference_start) = reference.start_latlng {
        let Some(candidate_start) = candidate.start_latlng else {
            return false;
        };
        if haversine_meters(reference_start, candidate_start) > START_POINT_RADIUS_METERS {
            return false;
        }
    }

    true
}

/// Great-circle distance between two `[lat, lng]` coordinates.
fn haversine_meters(a: LatLng, b: LatLng) -> f64 {
    Haversine.distance(Point::new(a[1], a[0]), Point::new(b[1], b[0]))
}

/// The cohort of activities comparable to `reference`, ascending by start
/// date. The reference itself is always part of the result.
///
/// With `use_segment_refinement`, and only when the reference carries segment
/// efforts, the cohort is narrowed to activities sharing at least one segment
/// with the reference. That requires segment detail on both sides; run
/// [`SimilarityService::prefetch_details`] first to populate it.
pub fn find_similar(
    reference: &Activity,
    pool: &[Activity],
    use_segment_refinement: bool,
) -> Vec<Activity> {
    let mut matches: Vec<Activity> = pool
        .iter()
        .filter(|candidate| is_base_match(reference, candidate))
        .cloned()
        .collect();

    if !matches.iter().any(|a| a.id == reference.id) {
        matches.push(reference.clone());
    }

    if use_segment_refinement {
        let reference_segments: HashSet<u64> = reference.segment_ids().collect();
        if !reference_segments.is_empty() {
            matches.retain(|candidate| {
                candidate.id == reference.id
                    || candidate
                        .segment_ids()
                        .any(|id| reference_segments.contains(&id))
            });
        }
    }

    matches.sort_by_key(Activity::start_date_utc);
    matches
}

/// Fetches the activity detail needed before segment refinement can run.
pub struct SimilarityService {
    api: Arc<dyn StravaApi>,
    tokens: Arc<TokenManager>,
    store: Arc<dyn ActivityStore>,
}

impl SimilarityService {
    pub fn new(
        api: Arc<dyn StravaApi>,
        tokens: Arc<TokenManager>,
        store: Arc<dyn ActivityStore>,
    ) -> Self {
        Self { api, tokens, store }
    }

    /// Fetch full detail for the first base candidates still missing segment
    /// efforts, persisting the detailed records.
    ///
    /// Sequential and throttled; an individual fetch failure is logged and
    /// the candidate skipped, never aborting the batch. Returns the base
    /// candidates with whatever detail is now available.
    pub async fn prefetch_details(
        &self,
        reference: &Activity,
        pool: &[Activity],
    ) -> Result<Vec<Activity>> {
        let token = self.tokens.get_valid_token().await?;

        let mut candidates = find_similar(reference, pool, false);
        candidates.truncate(MAX_DETAIL_FETCHES);

        let mut fetched_any = false;
        let mut detailed = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if candidate.has_detail() {
                detailed.push(candidate);
                continue;
            }

            if fetched_any {
                tokio::time::sleep(DETAIL_FETCH_DELAY).await;
            }
            fetched_any = true;

            match self.api.get_activity(&token, candidate.id).await {
                Ok(full) => detailed.push(full),
                Err(e) => {
                    tracing::warn!(
                        activity_id = candidate.id,
                        error = %e,
                        "detail fetch failed, skipping candidate"
                    );
                    detailed.push(candidate);
                }
            }
        }

        let newly_detailed: Vec<Activity> = detailed
            .iter()
            .filter(|a| a.has_detail())
            .cloned()
            .collect();
        self.store.bulk_upsert(&newly_detailed).await?;
        tracing::info!(
            candidates = detailed.len(),
            detailed = newly_detailed.len(),
            "detail prefetch complete"
        );

        Ok(detailed)
    }
}
