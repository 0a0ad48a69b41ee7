//! Notification surface bridge.
//!
//! Abstracts the host's system notification area:
//! - **Android**: foreground-service notification on a dedicated channel
//! - **Desktop**: freedesktop notifications, tray tooltip or plain log output
//!
//! The core owns exactly one notification identity per process lifetime and
//! drives it through `show` → `update`* → `withdraw`. Styling is left to the
//! host; the core only supplies title, body and actions.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Action identifier the host reports back when the user taps "Stop".
pub const STOP_ACTION_ID: &str = "stop";

/// Stable notification identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub u32);

/// Channel (category) under which the notification is posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
}

impl NotificationChannel {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Text rendered in the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Button embedded in the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Identifier reported back by the host when invoked.
    pub id: String,
    /// Button label.
    pub label: String,
}

impl NotificationAction {
    /// The "Stop" action routed to the playback stop command.
    pub fn stop(label: impl Into<String>) -> Self {
        Self {
            id: STOP_ACTION_ID.to_string(),
            label: label.into(),
        }
    }
}

/// Host notification surface.
///
/// Notifications posted through `show` are ongoing: the user cannot swipe
/// them away, only the core withdraws them.
#[async_trait::async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Register the channel notifications are posted on. Called once before
    /// the first `show`; repeated calls must be harmless.
    async fn ensure_channel(&self, channel: &NotificationChannel) -> Result<()> {
        let _ = channel;
        Ok(())
    }

    /// Post a new ongoing notification.
    async fn show(
        &self,
        id: NotificationId,
        content: NotificationContent,
        actions: Vec<NotificationAction>,
    ) -> Result<()>;

    /// Replace the text of a posted notification.
    async fn update(&self, id: NotificationId, content: NotificationContent) -> Result<()>;

    /// Remove the notification. Removing an absent notification is a no-op.
    async fn withdraw(&self, id: NotificationId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_action_uses_well_known_id() {
        let action = NotificationAction::stop("Stop");
        assert_eq!(action.id, STOP_ACTION_ID);
        assert_eq!(action.label, "Stop");
    }

    struct NullSurface;

    #[async_trait::async_trait]
    impl NotificationSurface for NullSurface {
        async fn show(
            &self,
            _id: NotificationId,
            _content: NotificationContent,
            _actions: Vec<NotificationAction>,
        ) -> Result<()> {
            Ok(())
        }

        async fn update(&self, _id: NotificationId, _content: NotificationContent) -> Result<()> {
            Ok(())
        }

        async fn withdraw(&self, _id: NotificationId) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn ensure_channel_defaults_to_noop() {
        let surface = NullSurface;
        let channel = NotificationChannel::new("radio_playback", "Radio Playback");
        assert!(surface.ensure_channel(&channel).await.is_ok());
        assert!(surface.ensure_channel(&channel).await.is_ok());
    }
}
