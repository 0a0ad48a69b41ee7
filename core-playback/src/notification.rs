//! # Notification Presenter
//!
//! Keeps the host's ongoing playback notification in sync with the latest
//! [`PlaybackStatus`]:
//!
//! | Status | Surface call |
//! |---|---|
//! | Buffering / Playing, not shown | `ensure_channel` (once), `show` with the Stop action |
//! | Buffering / Playing, shown, text changed | `update` |
//! | Buffering / Playing, shown, same text | none |
//! | Idle / Stopped / Error | `withdraw` if shown, otherwise none |
//!
//! Surface failures are logged and never abort the caller: the published
//! status is the source of truth and the next `present` retries.

use std::sync::Arc;

use bridge_traits::{NotificationAction, NotificationContent, NotificationSurface};
use core_runtime::config::NotificationSettings;
use tracing::{debug, warn};

use crate::status::{PlaybackState, PlaybackStatus};

/// Derive the notification text for `status`.
///
/// Title is the stream name, falling back to `default_title`. Body depends on
/// the state:
///
/// - Buffering: `Buffering: {name}`
/// - Playing: `{artist} - {title}`, `{title}`, or `Playing`
/// - Stopped: `Stopped`
/// - Error: `Error: {message}`
pub fn derive_content(status: &PlaybackStatus, default_title: &str) -> NotificationContent {
    let name = status
        .stream_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let title = name.unwrap_or(default_title).to_string();

    let body = match status.state {
        PlaybackState::Buffering => match name {
            Some(name) => format!("Buffering: {}", name),
            None => "Buffering".to_string(),
        },
        PlaybackState::Playing => match (status.artist.as_deref(), status.title.as_deref()) {
            (Some(artist), Some(track)) => format!("{} - {}", artist, track),
            (_, Some(track)) => track.to_string(),
            _ => "Playing".to_string(),
        },
        PlaybackState::Stopped => "Stopped".to_string(),
        PlaybackState::Error => match status.error_message.as_deref() {
            Some(message) => format!("Error: {}", message),
            None => "Error".to_string(),
        },
        PlaybackState::Idle => "Idle".to_string(),
    };

    NotificationContent::new(title, body)
}

/// Owner of the single ongoing notification.
pub struct NotificationPresenter {
    surface: Arc<dyn NotificationSurface>,
    settings: NotificationSettings,
    channel_ready: bool,
    shown: Option<NotificationContent>,
}

impl NotificationPresenter {
    pub fn new(surface: Arc<dyn NotificationSurface>, settings: NotificationSettings) -> Self {
        Self {
            surface,
            settings,
            channel_ready: false,
            shown: None,
        }
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    /// Whether the notification is currently posted.
    pub fn is_shown(&self) -> bool {
        self.shown.is_some()
    }

    /// The embedded stop button.
    pub fn stop_action(&self) -> NotificationAction {
        NotificationAction::stop(self.settings.stop_action_label.clone())
    }

    pub fn derive(&self, status: &PlaybackStatus) -> NotificationContent {
        derive_content(status, &self.settings.default_title)
    }

    /// Bring the notification in line with `status`. Safe to call on every
    /// publish.
    pub async fn present(&mut self, status: &PlaybackStatus) {
        if !status.is_active() {
            self.withdraw().await;
            return;
        }

        let content = self.derive(status);
        match &self.shown {
            None => self.show(content).await,
            Some(current) if *current == content => {}
            Some(_) => {
                let id = self.settings.id;
                match self.surface.update(id, content.clone()).await {
                    Ok(()) => self.shown = Some(content),
                    Err(err) => warn!(error = %err, "failed to update playback notification"),
                }
            }
        }
    }

    /// Remove the notification. No surface call when nothing is shown.
    pub async fn withdraw(&mut self) {
        if self.shown.take().is_none() {
            debug!("playback notification already withdrawn");
            return;
        }

        if let Err(err) = self.surface.withdraw(self.settings.id).await {
            warn!(error = %err, "failed to withdraw playback notification");
        }
    }

    async fn show(&mut self, content: NotificationContent) {
        if !self.channel_ready {
            match self.surface.ensure_channel(&self.settings.channel).await {
                Ok(()) => self.channel_ready = true,
                Err(err) => warn!(error = %err, "failed to register notification channel"),
            }
        }

        let actions = vec![self.stop_action()];
        match self.surface.show(self.settings.id, content.clone(), actions).await {
            Ok(()) => self.shown = Some(content),
            Err(err) => warn!(error = %err, "failed to show playback notification"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::{NotificationChannel, NotificationId, STOP_ACTION_ID};
    use mockall::mock;
    use mockall::predicate::*;

    mock! {
        Surface {}

        #[async_trait::async_trait]
        impl NotificationSurface for Surface {
            async fn ensure_channel(&self, channel: &NotificationChannel) -> BridgeResult<()>;
            async fn show(
                &self,
                id: NotificationId,
                content: NotificationContent,
                actions: Vec<NotificationAction>,
            ) -> BridgeResult<()>;
            async fn update(&self, id: NotificationId, content: NotificationContent) -> BridgeResult<()>;
            async fn withdraw(&self, id: NotificationId) -> BridgeResult<()>;
        }
    }

    fn playing(name: Option<&str>, artist: Option<&str>, title: Option<&str>) -> PlaybackStatus {
        PlaybackStatus::starting(name.map(String::from))
            .to_playing()
            .with_track(
                artist.map(String::from),
                title.map(String::from),
                name.map(String::from),
            )
    }

    #[test]
    fn derive_buffering() {
        let content = derive_content(
            &PlaybackStatus::starting(Some("Jazz FM".into())),
            "Audio Streaming",
        );
        assert_eq!(content.title, "Jazz FM");
        assert_eq!(content.body, "Buffering: Jazz FM");
    }

    #[test]
    fn derive_playing_variants() {
        let both = derive_content(&playing(Some("R"), Some("A"), Some("T")), "D");
        assert_eq!(both.body, "A - T");

        let title_only = derive_content(&playing(Some("R"), None, Some("T")), "D");
        assert_eq!(title_only.body, "T");

        let artist_only = derive_content(&playing(Some("R"), Some("A"), None), "D");
        assert_eq!(artist_only.body, "Playing");
    }

    #[test]
    fn derive_falls_back_to_default_title() {
        let content = derive_content(&PlaybackStatus::starting(None), "Audio Streaming");
        assert_eq!(content.title, "Audio Streaming");
        assert_eq!(content.body, "Buffering");

        let blank = derive_content(&PlaybackStatus::starting(Some("  ".into())), "Audio Streaming");
        assert_eq!(blank.title, "Audio Streaming");
    }

    #[test]
    fn derive_terminal_states() {
        let status = playing(Some("R"), Some("A"), Some("T"));
        assert_eq!(derive_content(&status.to_stopped(), "D").body, "Stopped");
        assert_eq!(
            derive_content(&status.to_error("HTTP 404"), "D").body,
            "Error: HTTP 404"
        );
        assert_eq!(derive_content(&status.to_stopped(), "D").title, "R");
    }

    #[tokio::test]
    async fn shows_once_then_updates_then_withdraws() {
        let mut surface = MockSurface::new();
        surface.expect_ensure_channel().times(1).returning(|_| Ok(()));
        surface
            .expect_show()
            .withf(|id, content, actions| {
                *id == NotificationId(1)
                    && content.body == "Buffering: R"
                    && actions.len() == 1
                    && actions[0].id == STOP_ACTION_ID
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        surface
            .expect_update()
            .with(eq(NotificationId(1)), eq(NotificationContent::new("R", "A - T")))
            .times(1)
            .returning(|_, _| Ok(()));
        surface.expect_withdraw().times(1).returning(|_| Ok(()));

        let mut presenter =
            NotificationPresenter::new(Arc::new(surface), NotificationSettings::default());

        let buffering = PlaybackStatus::starting(Some("R".into()));
        presenter.present(&buffering).await;
        assert!(presenter.is_shown());

        let status = playing(Some("R"), Some("A"), Some("T"));
        presenter.present(&status).await;
        // Same text again: no surface call
        presenter.present(&status).await;

        presenter.present(&status.to_stopped()).await;
        assert!(!presenter.is_shown());

        // Already gone: no surface call
        presenter.withdraw().await;
        presenter.present(&status.to_error("x")).await;
    }

    #[tokio::test]
    async fn failed_show_is_retried() {
        let mut surface = MockSurface::new();
        surface.expect_ensure_channel().returning(|_| Ok(()));
        let mut attempts = 0;
        surface.expect_show().times(2).returning(move |_, _, _| {
            attempts += 1;
            if attempts == 1 {
                Err(BridgeError::OperationFailed("denied".into()))
            } else {
                Ok(())
            }
        });

        let mut presenter =
            NotificationPresenter::new(Arc::new(surface), NotificationSettings::default());
        let status = PlaybackStatus::starting(None);

        presenter.present(&status).await;
        assert!(!presenter.is_shown());

        presenter.present(&status).await;
        assert!(presenter.is_shown());
    }
}
