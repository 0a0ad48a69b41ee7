//! # Playback Session Core
//!
//! Plays one internet audio stream at a time and keeps observers and the
//! host's ongoing notification in sync with it.
//!
//! ## Overview
//!
//! - [`controller`]: the Session Controller, a single task that serializes
//!   `play`/`stop` commands and engine events into one published
//!   [`PlaybackStatus`]
//! - [`notification`]: the Notification Presenter deriving title/body from
//!   each status and driving the host notification surface
//! - [`session`]: engine handle ownership and generation tagging of engine
//!   events
//! - [`metadata`]: stream name resolution from inline metadata
//! - [`status`]: the published status snapshot
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::SessionController;
//!
//! let handle = SessionController::spawn(&config);
//! handle.play("https://radio.example/live.mp3", "Example FM").await?;
//!
//! let mut status = handle.subscribe();
//! while let Some(snapshot) = status.changed().await {
//!     println!("{} {:?}", snapshot.state, snapshot.title);
//! }
//! ```

pub mod controller;
pub mod error;
pub mod metadata;
pub mod notification;
pub mod session;
pub mod status;

pub use controller::{ControllerHandle, SessionController};
pub use error::{PlaybackError, Result};
pub use metadata::TrackInfo;
pub use notification::{derive_content, NotificationPresenter};
pub use session::Generation;
pub use status::{PlaybackState, PlaybackStatus};
