// SPDX-License-Identifier: MIT

//! OAuth credential state.

use serde::{Deserialize, Serialize};

/// The full credential record persisted to durable storage.
///
/// Mutated only by a successful authentication or refresh; removed only by an
/// explicit disconnect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Expiry as epoch seconds
    pub expires_at: Option<i64>,
}
