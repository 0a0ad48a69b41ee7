//! # Status Channel and Session Event Bus
//!
//! Two publication mechanisms with different delivery guarantees:
//!
//! - [`StatusBus`] carries the *current* playback status. It is a
//!   last-write-wins channel built on `tokio::sync::watch`: a new subscriber
//!   immediately sees the latest value, a slow subscriber skips intermediate
//!   values and never observes an older value after a newer one, and
//!   publishing never waits on subscribers.
//! - [`EventBus`] carries discrete [`SessionEvent`]s (session started,
//!   ended, failed, ...) over `tokio::sync::broadcast`. Subscribers see every
//!   event emitted after they subscribed, unless they lag behind the buffer.
//!
//! ```text
//! ┌────────────────────┐  publish   ┌───────────┐  subscribe  ┌────────────┐
//! │ Session Controller ├───────────>│ StatusBus ├────────────>│ UI / tray  │
//! │                    │            └───────────┘             └────────────┘
//! │                    │   emit     ┌───────────┐  subscribe  ┌────────────┐
//! │                    ├───────────>│ EventBus  ├────────────>│ Analytics  │
//! └────────────────────┘            └───────────┘             └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::StatusBus;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = StatusBus::new(0u32);
//! let mut stream = bus.subscribe();
//!
//! bus.publish(1);
//! bus.publish(2);
//!
//! // Intermediate values may be skipped, the latest one is never lost.
//! assert_eq!(stream.changed().await, Some(2));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Broadcast subscribers can observe `RecvError::Lagged(n)` when they fall
//! more than the buffer size behind; this is non-fatal. `RecvError::Closed`
//! means the controller shut down.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::{broadcast, watch};

pub use tokio::sync::broadcast::error::RecvError;
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the session event channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Status Bus
// ============================================================================

/// Last-value broadcast of a status snapshot.
///
/// Values are replaced wholesale; readers never observe a partially
/// updated value.
pub struct StatusBus<T> {
    sender: watch::Sender<T>,
}

impl<T> StatusBus<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a bus holding `initial` as its current value.
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Replace the current value and wake subscribers.
    ///
    /// Never blocks and succeeds even when nobody is subscribed.
    pub fn publish(&self, value: T) {
        self.sender.send_replace(value);
    }

    /// Clone of the current value.
    pub fn current(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Attach a new subscriber. Its [`StatusStream::current`] is the latest
    /// value at the time of subscription.
    pub fn subscribe(&self) -> StatusStream<T> {
        StatusStream {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T> fmt::Debug for StatusBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusBus")
            .field("subscriber_count", &self.sender.receiver_count())
            .finish()
    }
}

/// Subscriber side of a [`StatusBus`].
#[derive(Clone)]
pub struct StatusStream<T> {
    receiver: watch::Receiver<T>,
}

impl<T> StatusStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Clone of the latest value, seen or not.
    pub fn current(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Wait for a value newer than the last one returned by this stream.
    ///
    /// Returns `None` once the bus is dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the current value satisfies `predicate`, checking the
    /// current value first.
    ///
    /// Returns `None` if the bus is dropped before that happens.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        self.receiver
            .wait_for(predicate)
            .await
            .ok()
            .map(|value| value.clone())
    }
}

// ============================================================================
// Session Events
// ============================================================================

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Discrete playback session milestones.
///
/// `generation` identifies the engine handle the session ran on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// A new engine handle was created for a stream.
    Started {
        generation: u64,
        stream_name: Option<String>,
    },
    /// The engine started producing audio.
    Playing { generation: u64 },
    /// The stream reached its end.
    Ended { generation: u64 },
    /// The engine reported a terminal error.
    Failed { generation: u64, message: String },
    /// Playback was stopped by command. `generation` is `None` when no
    /// engine handle was live.
    Stopped { generation: Option<u64> },
}

impl SessionEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            SessionEvent::Started { .. } => "Playback session started",
            SessionEvent::Playing { .. } => "Stream playing",
            SessionEvent::Ended { .. } => "Stream ended",
            SessionEvent::Failed { .. } => "Playback failed",
            SessionEvent::Stopped { .. } => "Playback stopped",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            SessionEvent::Failed { .. } => EventSeverity::Error,
            SessionEvent::Started { .. } | SessionEvent::Ended { .. } => EventSeverity::Info,
            SessionEvent::Playing { .. } | SessionEvent::Stopped { .. } => EventSeverity::Debug,
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast channel for [`SessionEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event and returns the number of subscribers reached.
    ///
    /// Emitting with nobody subscribed is not an error.
    pub fn emit(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&SessionEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, SessionEvent};
///
/// let bus = EventBus::default();
/// let failures = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, SessionEvent::Failed { .. }));
/// ```
pub struct EventStream {
    receiver: Receiver<SessionEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<SessionEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by [`recv`](Self::recv).
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SessionEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once every sender is dropped.
    pub async fn recv(&mut self) -> Result<SessionEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            match &self.filter {
                Some(filter) if !filter(&event) => continue,
                _ => return Ok(event),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn status_bus_replays_latest_to_new_subscribers() {
        let bus = StatusBus::new("idle".to_string());
        bus.publish("buffering".to_string());

        let stream = bus.subscribe();
        assert_eq!(stream.current(), "buffering");
        assert_eq!(bus.current(), "buffering");
    }

    #[tokio::test]
    async fn status_bus_is_last_write_wins() {
        let bus = StatusBus::new(0u32);
        let mut stream = bus.subscribe();

        for value in 1..=10 {
            bus.publish(value);
        }

        assert_eq!(stream.changed().await, Some(10));

        // Nothing newer pending
        let pending = tokio::time::timeout(Duration::from_millis(20), stream.changed()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn status_bus_publish_without_subscribers() {
        let bus = StatusBus::new(1u8);
        bus.publish(2);
        assert_eq!(bus.current(), 2);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn status_stream_wait_for_checks_current_value() {
        let bus = StatusBus::new(5u32);
        let mut stream = bus.subscribe();
        assert_eq!(stream.wait_for(|v| *v == 5).await, Some(5));
    }

    #[tokio::test]
    async fn status_stream_ends_when_bus_dropped() {
        let bus = StatusBus::new(0u32);
        let mut stream = bus.subscribe();
        drop(bus);
        assert_eq!(stream.changed().await, None);
    }

    #[test]
    fn event_bus_emit_without_subscribers() {
        let bus = EventBus::new(4);
        assert_eq!(bus.emit(SessionEvent::Stopped { generation: None }), 0);
    }

    #[tokio::test]
    async fn event_stream_filters() {
        let bus = EventBus::new(8);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, SessionEvent::Ended { .. }));

        bus.emit(SessionEvent::Playing { generation: 1 });
        bus.emit(SessionEvent::Ended { generation: 1 });

        assert_eq!(
            stream.recv().await.unwrap(),
            SessionEvent::Ended { generation: 1 }
        );
    }

    #[test]
    fn session_event_severity_and_serialization() {
        let event = SessionEvent::Failed {
            generation: 2,
            message: "HTTP 404".to_string(),
        };
        assert_eq!(event.severity(), EventSeverity::Error);
        assert_eq!(event.to_string(), "Playback failed");

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"Failed\""));
        let back: SessionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
