//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux) and headless daemons.
//!
//! ## Overview
//!
//! - `HttpStreamEngine`: stream engine using `reqwest`, with ICY metadata
//! - `LogNotificationSurface`: notification rendered as structured log lines
//! - `DesktopProcessHost`: stop requests exposed as a cancellation token
//! - `ConsoleLoggerSink`: log forwarding to stderr
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopProcessHost, HttpEngineConfig, HttpStreamEngine, LogNotificationSurface};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = HttpStreamEngine::new(HttpEngineConfig::default())?;
//!     let surface = LogNotificationSurface::new();
//!     let host = DesktopProcessHost::new();
//!
//!     // Use in core configuration
//! }
//! ```

mod config;
mod engine;
pub mod icy;
mod lifecycle;
mod logger;
mod notification;
mod output;

pub use config::{HttpEngineConfig, DEFAULT_PREBUFFER_BYTES, DEFAULT_USER_AGENT};
pub use engine::{HttpStreamEngine, HttpStreamHandle};
pub use lifecycle::DesktopProcessHost;
pub use logger::ConsoleLoggerSink;
pub use notification::{LogNotificationSurface, RenderedNotification};
pub use output::{AudioOutput, DiscardOutput};
