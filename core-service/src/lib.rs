//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (stream engine,
//! notification surface, process host) into the playback core. Desktop
//! daemons typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`) and call [`bootstrap_desktop`]; other hosts build a
//! [`RadioConfig`] with their own bridges and call [`RadioService::new`].

pub mod error;

pub use error::{CoreError, Result};

pub use core_playback::{PlaybackState, PlaybackStatus};
pub use core_runtime::config::{NotificationSettings, RadioConfig, RadioConfigBuilder};
pub use core_runtime::events::{EventStream, SessionEvent, StatusStream};

use core_playback::{ControllerHandle, SessionController};
use tracing::info;

#[cfg(feature = "desktop-shims")]
use bridge_desktop::{DesktopProcessHost, HttpEngineConfig, HttpStreamEngine, LogNotificationSurface};
#[cfg(feature = "desktop-shims")]
use std::sync::Arc;

/// Primary façade exposed to host applications.
///
/// Cheap to clone; all clones drive the same session controller.
#[derive(Clone, Debug)]
pub struct RadioService {
    controller: ControllerHandle,
}

impl RadioService {
    /// Validate `config` and start the session controller in `Idle`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: RadioConfig) -> Result<Self> {
        config.validate()?;
        let controller = SessionController::spawn(&config);
        info!(notification_id = config.notification.id.0, "radio service started");
        Ok(Self { controller })
    }

    /// Play `url`, labelled `name` in status and notification.
    pub async fn play(&self, url: impl Into<String>, name: impl Into<String>) -> Result<()> {
        Ok(self.controller.play(url, name).await?)
    }

    pub async fn stop(&self) -> Result<()> {
        Ok(self.controller.stop().await?)
    }

    /// Forward a notification action id invoked by the host.
    pub async fn handle_action(&self, action_id: &str) -> Result<()> {
        Ok(self.controller.handle_action(action_id).await?)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.controller.status()
    }

    pub fn subscribe(&self) -> StatusStream<PlaybackStatus> {
        self.controller.subscribe()
    }

    pub fn events(&self) -> EventStream {
        self.controller.events()
    }

    pub fn controller(&self) -> &ControllerHandle {
        &self.controller
    }

    /// Process teardown: release the engine, withdraw the notification and
    /// stop the controller.
    pub async fn shutdown(&self) -> Result<()> {
        self.controller.shutdown().await?;
        info!("radio service stopped");
        Ok(())
    }
}

/// Service plus the desktop bridges it runs on.
#[cfg(feature = "desktop-shims")]
pub struct DesktopRadio {
    pub service: RadioService,
    pub host: Arc<DesktopProcessHost>,
    pub notifications: Arc<LogNotificationSurface>,
}

/// Convenience bootstrapper for desktop hosts.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use bridge_desktop::HttpEngineConfig;
/// use core_service::bootstrap_desktop;
///
/// let radio = bootstrap_desktop(HttpEngineConfig::default()).await?;
/// radio.service.play("https://radio.example/live.mp3", "Example FM").await?;
/// radio.host.stopped().await;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(engine_config: HttpEngineConfig) -> Result<DesktopRadio> {
    let engine = HttpStreamEngine::new(engine_config)
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    let host = Arc::new(DesktopProcessHost::new());
    let notifications = Arc::new(LogNotificationSurface::new());

    let config = RadioConfig::builder()
        .engine(Arc::new(engine))
        .notifications(notifications.clone())
        .process_host(host.clone())
        .build()?;

    Ok(DesktopRadio {
        service: RadioService::new(config)?,
        host,
        notifications,
    })
}
