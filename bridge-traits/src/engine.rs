//! Stream engine bridge traits.
//!
//! The engine is the network/decode component that turns a stream URI into
//! audible output. The core never looks inside it: it asks the engine to
//! [`open`](StreamEngine::open) a URI and then only reacts to the
//! [`EngineEvent`]s the engine pushes into the supplied [`EngineEventSink`].
//!
//! Engines typically deliver events from their own worker thread or task.
//! Sinks must therefore be cheap, non-blocking and callable from anywhere;
//! the core's sink implementation only enqueues the event onto the
//! controller's own execution context.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Inline metadata reported by an engine while a stream is running.
///
/// Stream encoders are inconsistent about where they put station identity,
/// so engines report every slot they saw and leave the interpretation to the
/// core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMetadata {
    /// Track artist, when the encoder separates it from the title.
    pub artist: Option<String>,
    /// Track title.
    pub title: Option<String>,
    /// Station name (e.g. the `icy-name` header).
    pub station: Option<String>,
    /// Free-form display title as sent by the encoder.
    pub display_title: Option<String>,
}

impl StreamMetadata {
    /// Metadata carrying only a station name.
    pub fn station(name: impl Into<String>) -> Self {
        Self {
            station: Some(name.into()),
            ..Default::default()
        }
    }

    /// Metadata carrying an artist/title pair.
    pub fn track(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Attach a display title.
    pub fn with_display_title(mut self, display_title: impl Into<String>) -> Self {
        self.display_title = Some(display_title.into());
        self
    }

    /// Returns `true` if no slot carries a value.
    pub fn is_empty(&self) -> bool {
        self.artist.is_none()
            && self.title.is_none()
            && self.station.is_none()
            && self.display_title.is_none()
    }
}

/// Lifecycle events an engine reports for the stream it was opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine is waiting for enough data to start or resume output.
    Buffering,
    /// Enough data is buffered to start output.
    Ready,
    /// Output started (`true`) or halted (`false`).
    PlayingChanged(bool),
    /// The stream reached its end.
    Ended,
    /// Playback, network or decode failure. Terminal for the stream.
    Error(String),
    /// Inline metadata changed.
    MetadataChanged(StreamMetadata),
}

impl EngineEvent {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::Buffering => "buffering",
            EngineEvent::Ready => "ready",
            EngineEvent::PlayingChanged(_) => "playing_changed",
            EngineEvent::Ended => "ended",
            EngineEvent::Error(_) => "error",
            EngineEvent::MetadataChanged(_) => "metadata_changed",
        }
    }
}

/// Receiver for engine events.
///
/// Implementations must not block: engines call this from their audio or
/// network threads.
pub trait EngineEventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// A live engine instance bound to one stream.
pub trait EngineHandle: Send {
    /// Stop output and release every resource held for the stream.
    ///
    /// Must be synchronous and idempotent. Events already queued by the
    /// engine may still be delivered after this returns; receivers are
    /// expected to discard them.
    fn release(&mut self);
}

/// Factory for engine handles.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::engine::{EngineEventSink, StreamEngine};
///
/// fn start(engine: &dyn StreamEngine, sink: Arc<dyn EngineEventSink>) -> Result<()> {
///     let mut handle = engine.open("https://radio.example/stream.mp3", sink)?;
///     // ... later
///     handle.release();
///     Ok(())
/// }
/// ```
pub trait StreamEngine: Send + Sync {
    /// Create a handle for `url` and start connecting.
    ///
    /// Must return promptly; connection progress is reported through
    /// `sink`. A synchronous error means no handle was created.
    fn open(&self, url: &str, sink: Arc<dyn EngineEventSink>) -> Result<Box<dyn EngineHandle>>;
}
