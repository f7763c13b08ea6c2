// SPDX-License-Identifier: MIT

//! Segment-effort reconciliation.
//!
//! Merges efforts already embedded in locally cached activities with a fresh
//! remote fetch of the segment's effort history. Local efforts win on id
//! collision: the remote per-segment history can be incomplete, restricted,
//! or briefly unavailable, so local data must stay usable on its own.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Activity, Segment, SegmentEffort};
use crate::services::pagination::{fetch_all_pages, EFFORT_PAGE_CEILING, PER_PAGE};
use crate::services::strava::StravaApi;
use crate::services::token::TokenManager;

/// Segment detail plus the reconciled effort history, ascending by date.
#[derive(Debug, Clone)]
pub struct SegmentHistory {
    pub segment: Segment,
    pub efforts: Vec<SegmentEffort>,
}

/// Reconciles local and remote effort history for a single segment.
pub struct SegmentService {
    api: Arc<dyn StravaApi>,
    tokens: Arc<TokenManager>,
}

impl SegmentService {
    pub fn new(api: Arc<dyn StravaApi>, tokens: Arc<TokenManager>) -> Self {
        Self { api, tokens }
    }

    /// Load segment detail and the full effort history for `segment_id`.
    ///
    /// `activities` is the locally cached activity set; efforts embedded
    /// there are collected first. The remote history fetch is best-effort:
    /// on failure the local-only result is still returned.
    pub async fn load_segment_history<P>(
        &self,
        segment_id: u64,
        activities: &[Activity],
        on_progress: P,
    ) -> Result<SegmentHistory>
    where
        P: FnMut(usize),
    {
        let token = self.tokens.get_valid_token().await?;
        let segment = self.api.get_segment(&token, segment_id).await?;

        let mut efforts = collect_local_efforts(segment_id, activities);
        let mut seen: HashSet<u64> = efforts.iter().map(|e| e.id).collect();
        tracing::debug!(
            segment_id,
            local = efforts.len(),
            "collected local efforts"
        );

        match fetch_all_pages(
            |page| self.api.list_segment_efforts(&token, segment_id, page, PER_PAGE),
            EFFORT_PAGE_CEILING,
            on_progress,
        )
        .await
        {
            Ok(remote) => {
                for effort in remote {
                    // Local efforts are never overwritten by remote
                    // duplicates of the same id.
                    if seen.insert(effort.id) {
                        efforts.push(effort);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    segment_id,
                    error = %e,
                    "segment effort history fetch failed, showing local efforts only"
                );
            }
        }

        efforts.sort_by_key(SegmentEffort::start_date_utc);
        Ok(SegmentHistory { segment, efforts })
    }
}

/// Efforts on `segment_id` embedded in the cached activity set.
///
/// An effort without its own start date inherits the parent activity's; if no
/// date is resolvable either way the effort is dropped.
fn collect_local_efforts(segment_id: u64, activities: &[Activity]) -> Vec<SegmentEffort> {
    let mut efforts = Vec::new();
    let mut seen = HashSet::new();

    for activity in activities {
        let Some(embedded) = &activity.segment_efforts else {
            continue;
        };
        for effort in embedded {
            if effort.segment.id != segment_id {
                continue;
            }
            let mut effort = effort.clone();
            if effort.start_date.is_none() {
                effort.start_date = Some(activity.start_date.clone());
            }
            if effort.start_date_utc().is_none() {
                continue;
            }
            if seen.insert(effort.id) {
                efforts.push(effort);
            }
        }
    }

    efforts
}
