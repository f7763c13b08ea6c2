// SPDX-License-Identifier: MIT

//! Engine facade: the surface the presentation layer calls.
//!
//! Wires the token manager, API client, and stores together. The UI-level
//! invariant "at most one sync in flight" is enforced by the caller, not
//! here.

use std::sync::Arc;

use crate::config::Config;
use crate::db::{ActivityStore, CredentialStore, JsonFileStore};
use crate::error::Result;
use crate::models::Activity;
use crate::services::segment::{SegmentHistory, SegmentService};
use crate::services::similar::{self, SimilarityService};
use crate::services::strava::{Athlete, StravaApi, StravaClient};
use crate::services::sync::SyncService;
use crate::services::token::TokenManager;

pub struct Engine {
    api: Arc<dyn StravaApi>,
    tokens: Arc<TokenManager>,
    activities: Arc<dyn ActivityStore>,
    sync: SyncService,
    segments: SegmentService,
    similarity: SimilarityService,
}

impl Engine {
    /// Wire an engine from an API implementation and stores.
    pub fn new(
        api: Arc<dyn StravaApi>,
        activities: Arc<dyn ActivityStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let tokens = Arc::new(TokenManager::new(api.clone(), credentials));
        Self {
            sync: SyncService::new(api.clone(), tokens.clone(), activities.clone()),
            segments: SegmentService::new(api.clone(), tokens.clone()),
            similarity: SimilarityService::new(api.clone(), tokens.clone(), activities.clone()),
            api,
            tokens,
            activities,
        }
    }

    /// Build a production engine: HTTPS client plus the JSON-file store,
    /// seeding the stored client credentials from config.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let api = Arc::new(StravaClient::new(&config.strava_base_url));
        let store = Arc::new(JsonFileStore::new(&config.data_dir)?);
        let engine = Self::new(api, store.clone(), store);
        engine
            .tokens
            .update_client_credentials(&config.strava_client_id, &config.strava_client_secret)
            .await?;
        Ok(engine)
    }

    // ─── Connection lifecycle ────────────────────────────────────────────────

    /// Exchange an OAuth authorization code and persist the token triple.
    pub async fn connect(&self, code: &str) -> Result<Option<Athlete>> {
        self.tokens.connect(code).await
    }

    /// Deauthorize remotely (best-effort) and wipe local credentials.
    pub async fn disconnect(&self) -> Result<()> {
        self.tokens.disconnect().await
    }

    /// Store or replace the OAuth client id/secret pair.
    pub async fn update_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<()> {
        self.tokens
            .update_client_credentials(client_id, client_secret)
            .await
    }

    /// A currently valid access token, refreshed if needed.
    pub async fn get_valid_token(&self) -> Result<String> {
        self.tokens.get_valid_token().await
    }

    /// The connected athlete's profile.
    pub async fn athlete_profile(&self) -> Result<Athlete> {
        let token = self.tokens.get_valid_token().await?;
        self.api.get_athlete(&token).await
    }

    // ─── Sync & analytics ────────────────────────────────────────────────────

    /// Download the full activity history, replacing the local store.
    pub async fn full_sync<P>(&self, on_progress: P) -> Result<Vec<Activity>>
    where
        P: FnMut(usize),
    {
        self.sync.full_sync(on_progress).await
    }

    /// The locally stored activity set, newest first.
    pub async fn stored_activities(&self) -> Result<Vec<Activity>> {
        self.activities.get_all().await
    }

    /// Segment detail plus reconciled effort history for one segment.
    pub async fn load_segment_history<P>(
        &self,
        segment_id: u64,
        on_progress: P,
    ) -> Result<SegmentHistory>
    where
        P: FnMut(usize),
    {
        let activities = self.activities.get_all().await?;
        self.segments
            .load_segment_history(segment_id, &activities, on_progress)
            .await
    }

    /// Fetch the activity detail segment refinement needs, using the stored
    /// activity set as the candidate pool.
    pub async fn prefetch_similar_details(&self, reference: &Activity) -> Result<Vec<Activity>> {
        let pool = self.activities.get_all().await?;
        self.similarity.prefetch_details(reference, &pool).await
    }

    /// The cohort of activities comparable to `reference`.
    pub fn find_similar(
        &self,
        reference: &Activity,
        pool: &[Activity],
        use_segment_refinement: bool,
    ) -> Vec<Activity> {
        similar::find_similar(reference, pool, use_segment_refinement)
    }
}
