//! # Core Configuration Module
//!
//! Provides configuration management for the radio playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`RadioConfig`] that holds the host bridges and settings the core needs.
//! It enforces fail-fast validation so that a missing bridge is reported at
//! startup with an actionable message rather than at the first `Play`.
//!
//! ## Required Dependencies
//!
//! - `StreamEngine` - Opens stream URIs and reports playback events
//! - `NotificationSurface` - Shows the ongoing playback notification
//! - `ProcessHost` - Foreground promotion and self-termination
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::RadioConfig;
//! use std::sync::Arc;
//!
//! let config = RadioConfig::builder()
//!     .engine(Arc::new(MyEngine))
//!     .notifications(Arc::new(MySurface))
//!     .process_host(Arc::new(MyHost))
//!     .default_title("My Radio")
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::RadioConfig;
//!
//! // Missing every bridge
//! let config = RadioConfig::builder()
//!     .build()
//!     .expect("Should fail - missing required bridges");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{NotificationChannel, NotificationId, NotificationSurface, ProcessHost, StreamEngine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default controller command queue depth.
pub const DEFAULT_COMMAND_BUFFER_SIZE: usize = 64;

/// Notification title used when no station name is known.
pub const DEFAULT_NOTIFICATION_TITLE: &str = "Audio Streaming";

/// Settings for the ongoing playback notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Fixed notification identity for the lifetime of the process.
    #[serde(default = "default_notification_id")]
    pub id: NotificationId,

    /// Channel the notification is posted on.
    #[serde(default = "default_channel")]
    pub channel: NotificationChannel,

    /// Title shown when the stream has no known station name.
    #[serde(default = "default_title")]
    pub default_title: String,

    /// Label of the embedded stop button.
    #[serde(default = "default_stop_label")]
    pub stop_action_label: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            id: default_notification_id(),
            channel: default_channel(),
            default_title: default_title(),
            stop_action_label: default_stop_label(),
        }
    }
}

impl NotificationSettings {
    pub fn validate(&self) -> Result<()> {
        if self.channel.id.trim().is_empty() {
            return Err(Error::Config(
                "Notification channel id cannot be empty".to_string(),
            ));
        }

        if self.default_title.trim().is_empty() {
            return Err(Error::Config(
                "Default notification title cannot be empty".to_string(),
            ));
        }

        if self.stop_action_label.trim().is_empty() {
            return Err(Error::Config(
                "Stop action label cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_notification_id() -> NotificationId {
    NotificationId(1)
}

fn default_channel() -> NotificationChannel {
    NotificationChannel::new("radio_playback", "Radio Playback")
}

fn default_title() -> String {
    DEFAULT_NOTIFICATION_TITLE.to_string()
}

fn default_stop_label() -> String {
    "Stop".to_string()
}

/// Core configuration for the radio playback core.
///
/// Use [`RadioConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct RadioConfig {
    /// Stream engine adapter (required)
    pub engine: Arc<dyn StreamEngine>,

    /// Host notification surface (required)
    pub notifications: Arc<dyn NotificationSurface>,

    /// Hosting process lifecycle (required)
    pub process_host: Arc<dyn ProcessHost>,

    pub notification: NotificationSettings,

    /// Capacity of the session event broadcast buffer
    pub event_buffer_size: usize,

    /// Capacity of the controller's command queue
    pub command_buffer_size: usize,
}

impl std::fmt::Debug for RadioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioConfig")
            .field("engine", &"StreamEngine { ... }")
            .field("notifications", &"NotificationSurface { ... }")
            .field("process_host", &"ProcessHost { ... }")
            .field("notification", &self.notification)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("command_buffer_size", &self.command_buffer_size)
            .finish()
    }
}

impl RadioConfig {
    pub fn builder() -> RadioConfigBuilder {
        RadioConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.command_buffer_size == 0 {
            return Err(Error::Config(
                "Command buffer size must be greater than 0".to_string(),
            ));
        }

        self.notification.validate()
    }
}

fn capability_missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

/// Builder for constructing [`RadioConfig`] instances.
#[derive(Default)]
pub struct RadioConfigBuilder {
    engine: Option<Arc<dyn StreamEngine>>,
    notifications: Option<Arc<dyn NotificationSurface>>,
    process_host: Option<Arc<dyn ProcessHost>>,
    notification: NotificationSettings,
    event_buffer_size: Option<usize>,
    command_buffer_size: Option<usize>,
}

impl RadioConfigBuilder {
    /// Sets the stream engine implementation (required).
    pub fn engine(mut self, engine: Arc<dyn StreamEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the notification surface implementation (required).
    pub fn notifications(mut self, surface: Arc<dyn NotificationSurface>) -> Self {
        self.notifications = Some(surface);
        self
    }

    /// Sets the process host implementation (required).
    pub fn process_host(mut self, host: Arc<dyn ProcessHost>) -> Self {
        self.process_host = Some(host);
        self
    }

    /// Replaces all notification settings at once.
    pub fn notification_settings(mut self, settings: NotificationSettings) -> Self {
        self.notification = settings;
        self
    }

    /// Sets the fixed notification identity.
    ///
    /// Default: 1
    pub fn notification_id(mut self, id: u32) -> Self {
        self.notification.id = NotificationId(id);
        self
    }

    /// Sets the notification channel.
    pub fn notification_channel(mut self, channel: NotificationChannel) -> Self {
        self.notification.channel = channel;
        self
    }

    /// Sets the title shown while no station name is known.
    ///
    /// Default: "Audio Streaming"
    pub fn default_title(mut self, title: impl Into<String>) -> Self {
        self.notification.default_title = title.into();
        self
    }

    /// Sets the label of the embedded stop action.
    ///
    /// Default: "Stop"
    pub fn stop_action_label(mut self, label: impl Into<String>) -> Self {
        self.notification.stop_action_label = label.into();
        self
    }

    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`]
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Default: [`DEFAULT_COMMAND_BUFFER_SIZE`]
    pub fn command_buffer_size(mut self, size: usize) -> Self {
        self.command_buffer_size = Some(size);
        self
    }

    /// Builds the final `RadioConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] if a required bridge was not provided
    /// - [`Error::Config`] if a setting is out of range
    pub fn build(self) -> Result<RadioConfig> {
        let engine = self.engine.ok_or_else(|| {
            capability_missing(
                "StreamEngine",
                "A StreamEngine implementation is required to open streams. \
                 Desktop: use bridge_desktop::HttpStreamEngine. \
                 Mobile: inject the platform media player adapter.",
            )
        })?;

        let notifications = self.notifications.ok_or_else(|| {
            capability_missing(
                "NotificationSurface",
                "A NotificationSurface implementation is required for the playback notification. \
                 Desktop: use bridge_desktop::LogNotificationSurface. \
                 Mobile: inject the platform notification manager adapter.",
            )
        })?;

        let process_host = self.process_host.ok_or_else(|| {
            capability_missing(
                "ProcessHost",
                "A ProcessHost implementation is required for foreground promotion and shutdown. \
                 Desktop: use bridge_desktop::DesktopProcessHost. \
                 Mobile: inject the foreground service adapter.",
            )
        })?;

        let config = RadioConfig {
            engine,
            notifications,
            process_host,
            notification: self.notification,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            command_buffer_size: self
                .command_buffer_size
                .unwrap_or(DEFAULT_COMMAND_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}
