//! Notification surface for desktops without a notification daemon
//! integration: every operation becomes a structured log line.

use async_trait::async_trait;
use bridge_traits::{
    error::Result, NotificationAction, NotificationChannel, NotificationContent, NotificationId,
    NotificationSurface,
};
use parking_lot::Mutex;
use tracing::{debug, info};

/// What the surface currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotification {
    pub id: NotificationId,
    pub content: NotificationContent,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    channels: Vec<NotificationChannel>,
    current: Option<RenderedNotification>,
    shows: usize,
    updates: usize,
    withdrawals: usize,
}

/// [`NotificationSurface`] rendering to `tracing`.
#[derive(Debug, Default)]
pub struct LogNotificationSurface {
    state: Mutex<SurfaceState>,
}

impl LogNotificationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The notification as last shown or updated, `None` after withdrawal.
    pub fn current(&self) -> Option<RenderedNotification> {
        self.state.lock().current.clone()
    }

    pub fn channels(&self) -> Vec<NotificationChannel> {
        self.state.lock().channels.clone()
    }

    /// `(shows, updates, withdrawals)` performed so far.
    pub fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock();
        (state.shows, state.updates, state.withdrawals)
    }
}

#[async_trait]
impl NotificationSurface for LogNotificationSurface {
    async fn ensure_channel(&self, channel: &NotificationChannel) -> Result<()> {
        let mut state = self.state.lock();
        if !state.channels.contains(channel) {
            debug!(channel = %channel.id, name = %channel.name, "notification channel registered");
            state.channels.push(channel.clone());
        }
        Ok(())
    }

    async fn show(
        &self,
        id: NotificationId,
        content: NotificationContent,
        actions: Vec<NotificationAction>,
    ) -> Result<()> {
        let labels: Vec<&str> = actions.iter().map(|a| a.label.as_str()).collect();
        info!(
            id = id.0,
            title = %content.title,
            body = %content.body,
            actions = ?labels,
            "notification shown"
        );

        let mut state = self.state.lock();
        state.shows += 1;
        state.current = Some(RenderedNotification {
            id,
            content,
            actions,
        });
        Ok(())
    }

    async fn update(&self, id: NotificationId, content: NotificationContent) -> Result<()> {
        info!(id = id.0, title = %content.title, body = %content.body, "notification updated");

        let mut state = self.state.lock();
        state.updates += 1;
        match state.current.as_mut() {
            Some(current) if current.id == id => current.content = content,
            _ => {
                state.current = Some(RenderedNotification {
                    id,
                    content,
                    actions: Vec::new(),
                })
            }
        }
        Ok(())
    }

    async fn withdraw(&self, id: NotificationId) -> Result<()> {
        info!(id = id.0, "notification withdrawn");

        let mut state = self.state.lock();
        state.withdrawals += 1;
        if state.current.as_ref().is_some_and(|n| n.id == id) {
            state.current = None;
        }
        Ok(())
    }
}
