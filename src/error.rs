// SPDX-License-Identifier: MIT

//! Engine error types.
//!
//! Three failure classes cross the engine boundary: authentication problems
//! (reconnect required, never retried with the same token), transport problems
//! (the current call failed; the caller decides whether to try again), and
//! malformed remote data (surfaced verbatim).

/// Error type for all engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing, invalid, or expired credentials. Surfaced to the user as
    /// "reconnect required"; never silently retried with the same token.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Network or remote-server failure.
    #[error("transport error: {message}")]
    Transport { message: String, rate_limited: bool },

    /// Malformed or unexpected response shape.
    #[error("malformed response: {0}")]
    Data(String),

    /// Local store failure.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl Error {
    /// Transport error for a plain request failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
            rate_limited: false,
        }
    }

    /// Transport error caused by the remote rate limiter (HTTP 429).
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
            rate_limited: true,
        }
    }

    /// Whether this failure should trigger the "reconnect required" flow.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Error::Transport {
                rate_limited: true,
                ..
            }
        )
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
