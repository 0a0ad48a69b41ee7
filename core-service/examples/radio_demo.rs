//! Headless radio player.
//!
//! Plays one stream until it ends, fails, or Ctrl-C is pressed. Status
//! changes are printed as they are published; the notification surface
//! logs what a desktop tray would show.
//!
//! Run with:
//! ```bash
//! cargo run -p core-service --example radio_demo -- https://ice1.somafm.com/groovesalad-128-mp3 "Groove Salad"
//!
//! # JSON logs
//! RADIO_LOG_FORMAT=json cargo run -p core-service --example radio_demo -- <url> <name>
//! ```

use anyhow::Context;
use bridge_desktop::{ConsoleLoggerSink, HttpEngineConfig};
use bridge_traits::LogLevel;
use core_runtime::logging::{init_logging, redact_url, LogFormat, LoggingConfig};
use core_service::{bootstrap_desktop, PlaybackState};
use std::env;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let url = args
        .next()
        .context("usage: radio_demo <stream-url> [stream-name]")?;
    let name = args.next().unwrap_or_default();

    let format = match env::var("RADIO_LOG_FORMAT").as_deref() {
        Ok("json") => LogFormat::Json,
        Ok("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug)
            .with_logger_sink(Arc::new(ConsoleLoggerSink::new(LogLevel::Warn))),
    )
    .context("failed to initialize logging")?;

    let radio = bootstrap_desktop(HttpEngineConfig::default()).await?;
    let service = radio.service.clone();

    let mut status = service.subscribe();
    tokio::spawn(async move {
        while let Some(snapshot) = status.changed().await {
            let track = match (&snapshot.artist, &snapshot.title) {
                (Some(artist), Some(title)) => format!("{} - {}", artist, title),
                (None, Some(title)) => title.clone(),
                _ => String::new(),
            };
            println!(
                "[{}] {} {}{}",
                snapshot.state,
                snapshot.stream_name.as_deref().unwrap_or("-"),
                track,
                snapshot
                    .error_message
                    .as_deref()
                    .map(|e| format!(" ({})", e))
                    .unwrap_or_default()
            );
        }
    });

    info!(url = %redact_url(&url), "starting playback");
    service.play(url, name).await?;

    tokio::select! {
        _ = radio.host.stopped() => info!("core requested process stop"),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            service.stop().await?;
        }
    }

    let final_status = service.status();
    service.shutdown().await?;

    if final_status.state == PlaybackState::Error {
        anyhow::bail!(
            "playback failed: {}",
            final_status.error_message.unwrap_or_default()
        );
    }

    Ok(())
}
