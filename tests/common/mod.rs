// SPDX-License-Identifier: MIT

//! Shared test fixtures: a scripted Strava API fake plus model builders.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use paceline::error::{Error, Result};
use paceline::models::{Activity, Credentials, Segment, SegmentEffort};
use paceline::services::strava::{Athlete, StravaApi, TokenResponse};

/// Initialize test logging once; repeated calls are no-ops.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Scripted [`StravaApi`] implementation.
///
/// Pages are indexed from 1; anything past the scripted pages comes back
/// empty. Call counters let tests assert on request behavior.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeApi {
    pub activity_pages: Vec<Vec<Activity>>,
    /// Page number whose fetch should fail with a transport error.
    pub failing_activity_page: Option<u32>,
    pub activity_details: HashMap<u64, Activity>,
    pub failing_detail_ids: HashSet<u64>,
    pub segments: HashMap<u64, Segment>,
    pub effort_pages: Vec<Vec<SegmentEffort>>,
    pub effort_history_fails: bool,
    /// `None` makes refresh calls fail.
    pub refresh_result: Option<TokenResponse>,

    pub list_calls: AtomicU32,
    pub effort_list_calls: AtomicU32,
    pub detail_calls: AtomicU32,
    pub refresh_calls: AtomicU32,
    pub deauthorize_calls: AtomicU32,
}

#[async_trait]
impl StravaApi for FakeApi {
    async fn exchange_code(
        &self,
        _client_id: &str,
        _client_secret: &str,
        _code: &str,
    ) -> Result<TokenResponse> {
        Ok(TokenResponse {
            access_token: "exchanged-access".to_string(),
            refresh_token: "exchanged-refresh".to_string(),
            expires_at: chrono::Utc::now().timestamp() + 21600,
            athlete: Some(athlete()),
        })
    }

    async fn refresh_token(
        &self,
        _client_id: &str,
        _client_secret: &str,
        _refresh_token: &str,
    ) -> Result<TokenResponse> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_result
            .clone()
            .ok_or_else(|| Error::transport("refresh refused"))
    }

    async fn deauthorize(&self, _access_token: &str) -> Result<()> {
        self.deauthorize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_athlete(&self, _access_token: &str) -> Result<Athlete> {
        Ok(athlete())
    }

    async fn list_activities(
        &self,
        _access_token: &str,
        page: u32,
        _per_page: u32,
    ) -> Result<Vec<Activity>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_activity_page == Some(page) {
            return Err(Error::transport("scripted page failure"));
        }
        Ok(self
            .activity_pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_activity(&self, _access_token: &str, activity_id: u64) -> Result<Activity> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_detail_ids.contains(&activity_id) {
            return Err(Error::transport("scripted detail failure"));
        }
        self.activity_details
            .get(&activity_id)
            .cloned()
            .ok_or_else(|| Error::transport(format!("no detail scripted for {}", activity_id)))
    }

    async fn get_segment(&self, _access_token: &str, segment_id: u64) -> Result<Segment> {
        let segment = self
            .segments
            .get(&segment_id)
            .cloned()
            .ok_or_else(|| Error::transport(format!("no segment scripted for {}", segment_id)))?;
        // Mirror the production client contract: a detail response without a
        // name is malformed.
        if segment.name.is_empty() {
            return Err(Error::Data(format!(
                "segment {} response missing name",
                segment_id
            )));
        }
        Ok(segment)
    }

    async fn list_segment_efforts(
        &self,
        _access_token: &str,
        _segment_id: u64,
        page: u32,
        _per_page: u32,
    ) -> Result<Vec<SegmentEffort>> {
        self.effort_list_calls.fetch_add(1, Ordering::SeqCst);
        if self.effort_history_fails {
            return Err(Error::transport("scripted effort history failure"));
        }
        Ok(self
            .effort_pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default())
    }
}

#[allow(dead_code)]
pub fn athlete() -> Athlete {
    Athlete {
        id: 4242,
        firstname: "Test".to_string(),
        lastname: "Athlete".to_string(),
        profile: None,
    }
}

/// Credentials with a token valid for `valid_for_secs` from now.
#[allow(dead_code)]
pub fn credentials(valid_for_secs: i64) -> Credentials {
    Credentials {
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        access_token: Some("stored-access".to_string()),
        refresh_token: Some("stored-refresh".to_string()),
        expires_at: Some(chrono::Utc::now().timestamp() + valid_for_secs),
    }
}

/// A 10 km run with 100 m of gain starting near Seattle.
#[allow(dead_code)]
pub fn run(id: u64, start_date: &str) -> Activity {
    Activity {
        id,
        name: format!("Run {}", id),
        sport_type: "Run".to_string(),
        start_date: start_date.to_string(),
        distance: 10_000.0,
        moving_time: 3_000,
        elapsed_time: 3_100,
        total_elevation_gain: 100.0,
        average_speed: 3.3,
        max_speed: 4.9,
        average_heartrate: Some(150.0),
        start_latlng: Some([47.6, -122.3]),
        end_latlng: Some([47.6, -122.3]),
        map_polyline: None,
        segment_efforts: None,
    }
}

#[allow(dead_code)]
pub fn segment(id: u64, name: &str) -> Segment {
    Segment {
        id,
        name: name.to_string(),
        distance: 1_200.0,
        average_grade: 4.5,
        maximum_grade: 9.0,
        elevation_high: 180.0,
        elevation_low: 120.0,
        start_latlng: Some([47.61, -122.32]),
        end_latlng: Some([47.62, -122.33]),
        polyline: None,
        city: Some("Seattle".to_string()),
        state: Some("WA".to_string()),
        country: Some("United States".to_string()),
    }
}

#[allow(dead_code)]
pub fn effort(id: u64, segment_id: u64, start_date: Option<&str>) -> SegmentEffort {
    SegmentEffort {
        id,
        segment: segment(segment_id, &format!("Segment {}", segment_id)),
        elapsed_time: 240,
        moving_time: 235,
        start_date: start_date.map(str::to_string),
        average_heartrate: Some(155.0),
    }
}
