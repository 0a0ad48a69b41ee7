//! Hosting Process Lifecycle
//!
//! The playback core runs inside a long-lived process that the platform may
//! demote, suspend or kill. This module describes the two requests the core
//! makes of that process:
//!
//! - **Android**: `startForeground()` with the playback notification, then
//!   `stopSelf()` once playback is over
//! - **Desktop**: a daemon that keeps running while audio plays and exits its
//!   main loop on request
//! - **Tests**: counters or mocks

use crate::{error::Result, notification::NotificationId};

/// Hosting process as seen by the playback core.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::lifecycle::ProcessHost;
///
/// async fn after_teardown(host: &dyn ProcessHost) -> Result<()> {
///     host.request_stop().await
/// }
/// ```
#[async_trait::async_trait]
pub trait ProcessHost: Send + Sync {
    /// Promote the process so the platform keeps it alive while audio plays.
    ///
    /// `notification` is the ongoing notification that accompanies the
    /// promotion on platforms that require one.
    async fn enter_foreground(&self, notification: NotificationId) -> Result<()>;

    /// Ask the platform to stop the hosting process. The core keeps working
    /// until the process actually goes away; repeated requests are harmless.
    async fn request_stop(&self) -> Result<()>;
}
