// SPDX-License-Identifier: MIT

//! OAuth token lifecycle.
//!
//! The credential store is the single source of truth: every token-requiring
//! call starts by loading it, so a refresh performed by one in-flight
//! operation is immediately visible to the next. A successful refresh is
//! persisted durably before the new token is returned.

use std::sync::Arc;

use crate::db::CredentialStore;
use crate::error::{Error, Result};
use crate::models::Credentials;
use crate::services::strava::{Athlete, StravaApi};

/// Margin before token expiration when we proactively refresh.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Owns OAuth credential state and expiry; refreshes access tokens on demand.
pub struct TokenManager {
    api: Arc<dyn StravaApi>,
    store: Arc<dyn CredentialStore>,
}

impl TokenManager {
    pub fn new(api: Arc<dyn StravaApi>, store: Arc<dyn CredentialStore>) -> Self {
        Self { api, store }
    }

    /// Get a valid access token, refreshing first when the stored one is
    /// within the expiry margin.
    ///
    /// A failed refresh is an auth error the caller must surface as
    /// "reconnect required"; it is never retried here.
    pub async fn get_valid_token(&self) -> Result<String> {
        let credentials = self
            .store
            .load()
            .await?
            .ok_or_else(|| Error::Auth("missing credentials".to_string()))?;

        let now = chrono::Utc::now().timestamp();
        if let Some(expires_at) = credentials.expires_at {
            if now > expires_at - TOKEN_REFRESH_MARGIN_SECS {
                return self.refresh(credentials).await;
            }
        }

        credentials
            .access_token
            .ok_or_else(|| Error::Auth("missing credentials".to_string()))
    }

    async fn refresh(&self, credentials: Credentials) -> Result<String> {
        let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
            credentials.refresh_token.clone(),
        ) else {
            // Without the full refresh input set, the stale token is still
            // the best we have; let the remote side reject it if it must.
            tracing::debug!("refresh inputs incomplete, using stored access token");
            return credentials
                .access_token
                .ok_or_else(|| Error::Auth("missing credentials".to_string()));
        };

        tracing::info!("access token expired or expiring, refreshing");
        let response = match self
            .api
            .refresh_token(&client_id, &client_secret, &refresh_token)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                return Err(Error::Auth("refresh failed".to_string()));
            }
        };

        let updated = Credentials {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            access_token: Some(response.access_token.clone()),
            refresh_token: Some(response.refresh_token),
            expires_at: Some(response.expires_at),
        };

        // Persist before returning so a crash cannot leave the new token
        // known only in memory.
        self.store.save(&updated).await?;
        tracing::info!("token refreshed and stored");
        Ok(response.access_token)
    }

    /// Exchange an authorization code and persist the resulting triple.
    ///
    /// Requires client credentials to have been stored via
    /// [`TokenManager::update_client_credentials`] (or seeded from config).
    pub async fn connect(&self, code: &str) -> Result<Option<Athlete>> {
        let credentials = self.store.load().await?.unwrap_or_default();
        let (Some(client_id), Some(client_secret)) =
            (credentials.client_id.clone(), credentials.client_secret.clone())
        else {
            return Err(Error::Auth("missing credentials".to_string()));
        };

        let response = self
            .api
            .exchange_code(&client_id, &client_secret, code)
            .await?;

        let updated = Credentials {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            access_token: Some(response.access_token),
            refresh_token: Some(response.refresh_token),
            expires_at: Some(response.expires_at),
        };
        self.store.save(&updated).await?;

        tracing::info!(
            athlete_id = response.athlete.as_ref().map(|a| a.id),
            "OAuth connect complete, credentials stored"
        );
        Ok(response.athlete)
    }

    /// Store or replace the OAuth client id/secret pair, keeping any tokens.
    pub async fn update_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<()> {
        let mut credentials = self.store.load().await?.unwrap_or_default();
        credentials.client_id = Some(client_id.to_string());
        credentials.client_secret = Some(client_secret.to_string());
        self.store.save(&credentials).await
    }

    /// Best-effort remote deauthorization, then wipe local credentials.
    pub async fn disconnect(&self) -> Result<()> {
        match self.get_valid_token().await {
            Ok(token) => {
                if let Err(e) = self.api.deauthorize(&token).await {
                    tracing::warn!(error = %e, "deauthorization failed, clearing local credentials anyway");
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "no usable token at disconnect, clearing local credentials");
            }
        }
        self.store.clear().await?;
        tracing::info!("disconnected, credentials cleared");
        Ok(())
    }
}
