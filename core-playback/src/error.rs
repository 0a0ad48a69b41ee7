//! # Playback Error Types
//!
//! Engine failures never cross the controller boundary as `Err`: they are
//! folded into [`PlaybackState::Error`](crate::status::PlaybackState::Error)
//! and published. The variants below exist so that every outcome can be
//! classified and logged uniformly.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur in the playback core.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Blank or malformed stream URL on `play`. Resolved locally by
    /// routing to the stop path.
    #[error("Invalid play request: {0}")]
    InvalidRequest(String),

    /// Playback, network or decode failure reported by the engine.
    #[error("Engine failure: {0}")]
    EngineFailure(String),

    /// Event from an engine handle that is no longer live.
    #[error("Discarded stale event from generation {generation} (current: {current:?})")]
    StaleEventDiscarded { generation: u64, current: Option<u64> },

    /// The controller task is no longer running.
    #[error("Session controller is closed")]
    ControllerClosed,

    /// Host bridge call failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` for failures that surface to the user through the
    /// `Error` state.
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, PlaybackError::EngineFailure(_))
    }

    /// Returns `true` for outcomes that are only ever logged.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            PlaybackError::InvalidRequest(_) | PlaybackError::StaleEventDiscarded { .. }
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
