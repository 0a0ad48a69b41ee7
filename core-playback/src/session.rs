//! Engine sessions and generation tagging.
//!
//! Every engine handle the controller creates gets a fresh [`Generation`].
//! Events flow back through a [`TaggedEventSink`] that stamps them with that
//! generation before queueing them onto the controller, so events from a
//! handle that has since been released can be recognised and dropped.

use std::fmt;
use std::sync::Arc;

use bridge_traits::{EngineEvent, EngineEventSink, EngineHandle};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Monotonically increasing engine handle tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Advances the counter and returns the new generation.
    pub fn advance(&mut self) -> Generation {
        self.0 += 1;
        *self
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine event stamped with the generation of the handle that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEnvelope {
    pub generation: Generation,
    pub event: EngineEvent,
}

/// Sink handed to the engine for one handle.
pub struct TaggedEventSink {
    generation: Generation,
    queue: mpsc::UnboundedSender<EngineEnvelope>,
}

impl TaggedEventSink {
    pub fn new(generation: Generation, queue: mpsc::UnboundedSender<EngineEnvelope>) -> Arc<Self> {
        Arc::new(Self { generation, queue })
    }
}

impl EngineEventSink for TaggedEventSink {
    fn emit(&self, event: EngineEvent) {
        let envelope = EngineEnvelope {
            generation: self.generation,
            event,
        };
        if self.queue.send(envelope).is_err() {
            trace!(generation = %self.generation, "controller gone, dropping engine event");
        }
    }
}

/// The single live engine handle and the request that created it.
pub struct Session {
    generation: Generation,
    url: String,
    name: Option<String>,
    handle: Box<dyn EngineHandle>,
}

impl Session {
    pub fn new(
        generation: Generation,
        url: impl Into<String>,
        name: Option<String>,
        handle: Box<dyn EngineHandle>,
    ) -> Self {
        Self {
            generation,
            url: url.into(),
            name,
            handle,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Release the engine handle. Consumes the session so a released handle
    /// can never be reused.
    pub fn release(mut self) {
        debug!(generation = %self.generation, "releasing engine handle");
        self.handle.release();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("generation", &self.generation)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
