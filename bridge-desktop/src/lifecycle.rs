//! Process lifecycle for desktop daemons.
//!
//! Desktop processes have no foreground-service concept; entering the
//! foreground is only recorded. A stop request cancels a token the daemon's
//! main loop waits on through [`DesktopProcessHost::stopped`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bridge_traits::{error::Result, NotificationId, ProcessHost};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct DesktopProcessHost {
    shutdown: CancellationToken,
    foreground: AtomicBool,
    stop_requests: AtomicUsize,
}

impl DesktopProcessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once the core asked the process to stop.
    pub async fn stopped(&self) {
        self.shutdown.cancelled().await
    }

    pub fn is_stop_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }

    pub fn stop_requests(&self) -> usize {
        self.stop_requests.load(Ordering::SeqCst)
    }

    /// Token cancelled on stop requests, for wiring into other tasks.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

#[async_trait]
impl ProcessHost for DesktopProcessHost {
    async fn enter_foreground(&self, notification: NotificationId) -> Result<()> {
        if !self.foreground.swap(true, Ordering::SeqCst) {
            debug!(notification = notification.0, "entered foreground");
        }
        Ok(())
    }

    async fn request_stop(&self) -> Result<()> {
        self.stop_requests.fetch_add(1, Ordering::SeqCst);
        self.foreground.store(false, Ordering::SeqCst);
        info!("process stop requested");
        self.shutdown.cancel();
        Ok(())
    }
}
