// SPDX-License-Identifier: MIT

//! Full-history synchronization.
//!
//! A sync downloads the complete activity list as summary records and commits
//! it as one bulk replace. Replace, never merge: list records are summaries,
//! and a field-merge would quietly strip `segment_efforts` from previously
//! detailed records. Detail is re-fetched lazily afterwards.

use std::sync::Arc;

use crate::db::ActivityStore;
use crate::error::Result;
use crate::models::Activity;
use crate::services::pagination::{fetch_all_pages, ACTIVITY_PAGE_CEILING, PER_PAGE};
use crate::services::strava::StravaApi;
use crate::services::token::TokenManager;

/// Orchestrates a full resync of the activity history.
pub struct SyncService {
    api: Arc<dyn StravaApi>,
    tokens: Arc<TokenManager>,
    store: Arc<dyn ActivityStore>,
}

impl SyncService {
    pub fn new(
        api: Arc<dyn StravaApi>,
        tokens: Arc<TokenManager>,
        store: Arc<dyn ActivityStore>,
    ) -> Self {
        Self { api, tokens, store }
    }

    /// Download the full activity history and replace the local store.
    ///
    /// `on_progress` fires with the cumulative activity count after each
    /// fetched page. Any failure aborts the sync before the commit step, so
    /// the previously stored set stays untouched. An auth failure means
    /// "reconnect required"; it is the caller's call whether to offer a
    /// disconnect or a retry prompt.
    pub async fn full_sync<P>(&self, on_progress: P) -> Result<Vec<Activity>>
    where
        P: FnMut(usize),
    {
        let token = self.tokens.get_valid_token().await?;

        tracing::info!("starting full activity sync");
        let activities = fetch_all_pages(
            |page| self.api.list_activities(&token, page, PER_PAGE),
            ACTIVITY_PAGE_CEILING,
            on_progress,
        )
        .await?;

        self.store.replace_all(&activities).await?;
        tracing::info!(count = activities.len(), "full sync committed");
        Ok(activities)
    }
}
