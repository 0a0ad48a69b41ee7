//! # Host Bridge Traits
//!
//! Platform abstraction traits that the radio playback core consumes and each
//! host platform implements.
//!
//! ## Traits
//!
//! ### Playback
//! - [`StreamEngine`](engine::StreamEngine) - Opens a stream URI and reports lifecycle events
//! - [`EngineHandle`](engine::EngineHandle) - One live engine instance, released synchronously
//! - [`EngineEventSink`](engine::EngineEventSink) - Receives engine events from any thread
//!
//! ### Platform Integration
//! - [`NotificationSurface`](notification::NotificationSurface) - Ongoing status notification
//! - [`ProcessHost`](lifecycle::ProcessHost) - Foreground promotion and self-termination
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ In Progress |
//! | Android  | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it with an actionable message.
//!
//! ## Thread Safety
//!
//! Every bridge trait requires `Send + Sync` (handles: `Send`) so that
//! implementations can be shared across async tasks and engine threads.

pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod log;
pub mod notification;

pub use error::BridgeError;

// Re-export commonly used types
pub use engine::{EngineEvent, EngineEventSink, EngineHandle, StreamEngine, StreamMetadata};
pub use lifecycle::ProcessHost;
pub use log::{LogEntry, LogLevel, LoggerSink};
pub use notification::{
    NotificationAction, NotificationChannel, NotificationContent, NotificationId,
    NotificationSurface, STOP_ACTION_ID,
};
