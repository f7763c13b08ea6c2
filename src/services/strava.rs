// SPDX-License-Identifier: MIT

//! Strava API client.
//!
//! Handles:
//! - OAuth code exchange, token refresh, and deauthorization
//! - Paginated activity and segment-effort listing
//! - Activity, segment, and athlete detail fetches
//! - HTTP status mapping into the engine error taxonomy

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Activity, LatLng, Segment, SegmentEffort};

/// Seam between the engine and the remote API. The production implementation
/// is [`StravaClient`]; tests substitute scripted fakes.
#[async_trait]
pub trait StravaApi: Send + Sync {
    /// Exchange an OAuth authorization code for a token triple.
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<TokenResponse>;

    /// Refresh an expired access token.
    async fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenResponse>;

    /// Invalidate all tokens for the connected athlete.
    async fn deauthorize(&self, access_token: &str) -> Result<()>;

    /// Get the authenticated athlete profile.
    async fn get_athlete(&self, access_token: &str) -> Result<Athlete>;

    /// One page of activity summaries (no segment efforts).
    async fn list_activities(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Activity>>;

    /// Full activity detail, including segment efforts.
    async fn get_activity(&self, access_token: &str, activity_id: u64) -> Result<Activity>;

    /// Segment detail (name, geometry, grade stats).
    async fn get_segment(&self, access_token: &str, segment_id: u64) -> Result<Segment>;

    /// One page of the athlete's effort history on a segment.
    async fn list_segment_efforts(
        &self,
        access_token: &str,
        segment_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SegmentEffort>>;
}

/// Strava API client over HTTPS.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
}

impl StravaClient {
    /// Create a client rooted at `base_url` (normally `https://www.strava.com`).
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            http: reqwest::Client::new(),
            api_base: format!("{}/api/v3", base),
            oauth_base: format!("{}/oauth", base),
        }
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        Self::check_response_json(response).await
    }

    /// Form-encoded POST against the OAuth token endpoint.
    async fn post_token_form(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_base))
            .form(form)
            .send()
            .await
            .map_err(|e| Error::transport(format!("token request failed: {}", e)))?;

        let wire: TokenResponseWire = Self::check_response_json(response).await?;
        Ok(TokenResponse {
            access_token: wire.access_token,
            refresh_token: wire.refresh_token,
            expires_at: wire.expires_at,
            athlete: wire.athlete,
        })
    }

    /// Check response status and return an engine error if not successful.
    async fn check_response(response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        // Rate limit - caller may retry later
        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
            return Err(Error::rate_limited(format!("HTTP 429: {}", body)));
        }

        // Unauthorized - token invalid or expired; must not be retried as-is
        if status.as_u16() == 401 {
            return Err(Error::Auth(format!("HTTP 401: {}", body)));
        }

        Err(Error::transport(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(Error::rate_limited(format!("HTTP 429: {}", body)));
            }

            if status.as_u16() == 401 {
                return Err(Error::Auth(format!("HTTP 401: {}", body)));
            }

            return Err(Error::transport(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Data(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl StravaApi for StravaClient {
    async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<TokenResponse> {
        self.post_token_form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenResponse> {
        self.post_token_form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn deauthorize(&self, access_token: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/deauthorize", self.oauth_base))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::transport(format!("deauthorization request failed: {}", e)))?;

        Self::check_response(response).await?;
        tracing::info!("Strava deauthorization successful");
        Ok(())
    }

    async fn get_athlete(&self, access_token: &str) -> Result<Athlete> {
        let url = format!("{}/athlete", self.api_base);
        self.get_json(&url, access_token, &[]).await
    }

    async fn list_activities(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Activity>> {
        let url = format!("{}/athlete/activities", self.api_base);
        let wire: Vec<ActivityWire> = self
            .get_json(
                &url,
                access_token,
                &[("page", page.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;
        Ok(wire.into_iter().map(ActivityWire::into_model).collect())
    }

    async fn get_activity(&self, access_token: &str, activity_id: u64) -> Result<Activity> {
        let url = format!("{}/activities/{}", self.api_base, activity_id);
        let wire: ActivityWire = self.get_json(&url, access_token, &[]).await?;
        Ok(wire.into_model())
    }

    async fn get_segment(&self, access_token: &str, segment_id: u64) -> Result<Segment> {
        let url = format!("{}/segments/{}", self.api_base, segment_id);
        let wire: SegmentWire = self.get_json(&url, access_token, &[]).await?;
        // A detail response without a name is treated as a malformed or
        // absent segment.
        if wire.name.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Data(format!(
                "segment {} response missing name",
                segment_id
            )));
        }
        Ok(wire.into_model())
    }

    async fn list_segment_efforts(
        &self,
        access_token: &str,
        segment_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SegmentEffort>> {
        let url = format!("{}/segment_efforts", self.api_base);
        let wire: Vec<EffortWire> = self
            .get_json(
                &url,
                access_token,
                &[
                    ("segment_id", segment_id.to_string()),
                    ("page", page.to_string()),
                    ("per_page", per_page.to_string()),
                ],
            )
            .await?;
        Ok(wire.into_iter().map(EffortWire::into_model).collect())
    }
}

/// Token triple from the OAuth endpoint, with the athlete profile when the
/// grant was an authorization code.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as epoch seconds
    pub expires_at: i64,
    pub athlete: Option<Athlete>,
}

/// Athlete profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Athlete {
    pub id: u64,
    pub firstname: String,
    pub lastname: String,
    pub profile: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponseWire {
    access_token: String,
    refresh_token: String,
    expires_at: i64,
    athlete: Option<Athlete>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types: Strava's JSON shapes, converted into the storage models
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ActivityWire {
    id: u64,
    name: String,
    sport_type: String,
    start_date: String,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    moving_time: u32,
    #[serde(default)]
    elapsed_time: u32,
    #[serde(default)]
    total_elevation_gain: f64,
    #[serde(default)]
    average_speed: f64,
    #[serde(default)]
    max_speed: f64,
    average_heartrate: Option<f64>,
    start_latlng: Option<Vec<f64>>,
    end_latlng: Option<Vec<f64>>,
    map: Option<MapWire>,
    segment_efforts: Option<Vec<EffortWire>>,
}

/// Activity map data with polylines.
#[derive(Debug, Deserialize)]
struct MapWire {
    polyline: Option<String>,
    summary_polyline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EffortWire {
    id: u64,
    #[serde(default)]
    elapsed_time: u32,
    #[serde(default)]
    moving_time: u32,
    start_date: Option<String>,
    average_heartrate: Option<f64>,
    segment: SegmentWire,
}

#[derive(Debug, Deserialize)]
struct SegmentWire {
    id: u64,
    name: Option<String>,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    average_grade: f64,
    #[serde(default)]
    maximum_grade: f64,
    #[serde(default)]
    elevation_high: f64,
    #[serde(default)]
    elevation_low: f64,
    start_latlng: Option<Vec<f64>>,
    end_latlng: Option<Vec<f64>>,
    map: Option<MapWire>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl ActivityWire {
    fn into_model(self) -> Activity {
        let map_polyline = self
            .map
            .as_ref()
            .and_then(|m| m.polyline.clone().or_else(|| m.summary_polyline.clone()));

        let mut start_latlng = latlng_from(self.start_latlng);
        let mut end_latlng = latlng_from(self.end_latlng);

        // Some uploads carry a route but no start/end coordinates; recover
        // them from the polyline so the geo filter still applies.
        if start_latlng.is_none() || end_latlng.is_none() {
            if let Some((first, last)) = map_polyline.as_deref().and_then(polyline_endpoints) {
                start_latlng = start_latlng.or(Some(first));
                end_latlng = end_latlng.or(Some(last));
            }
        }

        Activity {
            id: self.id,
            name: self.name,
            sport_type: self.sport_type,
            start_date: self.start_date,
            distance: self.distance,
            moving_time: self.moving_time,
            elapsed_time: self.elapsed_time,
            total_elevation_gain: self.total_elevation_gain,
            average_speed: self.average_speed,
            max_speed: self.max_speed,
            average_heartrate: self.average_heartrate,
            start_latlng,
            end_latlng,
            map_polyline,
            segment_efforts: self
                .segment_efforts
                .map(|efforts| efforts.into_iter().map(EffortWire::into_model).collect()),
        }
    }
}

impl EffortWire {
    fn into_model(self) -> SegmentEffort {
        SegmentEffort {
            id: self.id,
            segment: self.segment.into_model(),
            elapsed_time: self.elapsed_time,
            moving_time: self.moving_time,
            start_date: self.start_date,
            average_heartrate: self.average_heartrate,
        }
    }
}

impl SegmentWire {
    fn into_model(self) -> Segment {
        Segment {
            id: self.id,
            name: self.name.unwrap_or_default(),
            distance: self.distance,
            average_grade: self.average_grade,
            maximum_grade: self.maximum_grade,
            elevation_high: self.elevation_high,
            elevation_low: self.elevation_low,
            start_latlng: latlng_from(self.start_latlng),
            end_latlng: latlng_from(self.end_latlng),
            polyline: self.map.and_then(|m| m.polyline.or(m.summary_polyline)),
            city: self.city,
            state: self.state,
            country: self.country,
        }
    }
}

/// Strava encodes coordinates as `[lat, lng]` arrays, sometimes empty.
fn latlng_from(wire: Option<Vec<f64>>) -> Option<LatLng> {
    let coords = wire?;
    if coords.len() < 2 {
        return None;
    }
    Some([coords[0], coords[1]])
}

/// First and last coordinates of an encoded polyline (precision 5).
fn polyline_endpoints(encoded: &str) -> Option<(LatLng, LatLng)> {
    let line = polyline::decode_polyline(encoded, 5).ok()?;
    let first = line.points().next()?;
    let last = line.points().last()?;
    // geo points are (x, y) = (lng, lat)
    Some(([first.y(), first.x()], [last.y(), last.x()]))
}
