//! # Playback Status
//!
//! [`PlaybackStatus`] is the immutable snapshot published to observers. The
//! controller never mutates a published status: every transition builds a
//! new value through one of the `to_*` methods below, which also enforce the
//! field invariants:
//!
//! - `artist`/`title` only survive in `Buffering`/`Playing`
//! - `error_message` is only set in `Error`
//! - `stream_name` survives into `Stopped` and `Error` ("last played")

use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Initial state after construction. Never re-entered.
    #[default]
    Idle,
    Buffering,
    Playing,
    Stopped,
    Error,
}

impl PlaybackState {
    /// Returns `true` while a session is running (notification shown).
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Buffering | PlaybackState::Playing)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Buffering => "buffering",
            PlaybackState::Playing => "playing",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of the playback session as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    /// Display name of the requested or playing stream.
    pub stream_name: Option<String>,
    pub artist: Option<String>,
    pub title: Option<String>,
    /// Human-readable failure detail, only in `Error`.
    pub error_message: Option<String>,
}

impl PlaybackStatus {
    /// Status at construction time.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Status of a freshly requested stream: buffering, no track metadata.
    pub fn starting(stream_name: Option<String>) -> Self {
        Self {
            state: PlaybackState::Buffering,
            stream_name,
            ..Self::default()
        }
    }

    /// Same stream, (re)buffering. Track metadata is kept.
    pub fn to_buffering(&self) -> Self {
        Self {
            state: PlaybackState::Buffering,
            error_message: None,
            ..self.clone()
        }
    }

    pub fn to_playing(&self) -> Self {
        Self {
            state: PlaybackState::Playing,
            error_message: None,
            ..self.clone()
        }
    }

    /// Keeps `stream_name`, clears everything else.
    pub fn to_stopped(&self) -> Self {
        Self {
            state: PlaybackState::Stopped,
            stream_name: self.stream_name.clone(),
            ..Self::default()
        }
    }

    /// Keeps `stream_name`, clears track metadata, records `message`.
    pub fn to_error(&self, message: impl Into<String>) -> Self {
        Self {
            state: PlaybackState::Error,
            stream_name: self.stream_name.clone(),
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Same state with replaced track metadata and stream name.
    pub fn with_track(
        &self,
        artist: Option<String>,
        title: Option<String>,
        stream_name: Option<String>,
    ) -> Self {
        Self {
            artist,
            title,
            stream_name,
            ..self.clone()
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
