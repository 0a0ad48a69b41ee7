//! # Session Controller
//!
//! The single owner of the playback session. All state transitions happen on
//! one tokio task that serializes two inputs:
//!
//! - commands from [`ControllerHandle`] (`play`, `stop`, `shutdown`)
//! - engine events, queued by a generation-tagged sink per engine handle
//!
//! ```text
//!  ControllerHandle ──Command──┐
//!                              ▼
//!                     ┌──────────────────┐  publish  ┌───────────┐
//!                     │ SessionController├──────────>│ StatusBus │
//!                     │  (spawned task)  │           └───────────┘
//!                     └──────────────────┘
//!                       ▲      │    │ present
//!  TaggedEventSink ─────┘      │    └────────> NotificationPresenter
//!  (generation, event)         │ open/release
//!                              ▼
//!                        StreamEngine
//! ```
//!
//! Commands are polled before engine events, so an engine event queued
//! before a `stop` or a superseding `play` is seen after the session it
//! belongs to has been released, and is discarded as stale.
//!
//! Command methods only fail with [`PlaybackError::ControllerClosed`].
//! Engine failures surface as [`PlaybackState::Error`] on the status bus.

use std::sync::Arc;

use bridge_traits::{
    EngineEvent, NotificationId, ProcessHost, StreamEngine, StreamMetadata, STOP_ACTION_ID,
};
use core_runtime::config::RadioConfig;
use core_runtime::events::{EventBus, EventStream, SessionEvent, StatusBus, StatusStream};
use core_runtime::logging::redact_url;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{PlaybackError, Result};
use crate::metadata;
use crate::notification::NotificationPresenter;
use crate::session::{EngineEnvelope, Generation, Session, TaggedEventSink};
use crate::status::{PlaybackState, PlaybackStatus};

#[derive(Debug)]
enum Command {
    Play { url: String, name: Option<String> },
    Stop,
    Shutdown { done: oneshot::Sender<()> },
}

/// Cloneable front door to a running [`SessionController`].
///
/// Commands are fire-and-forget: `play` returns once the request is queued,
/// the outcome is observed through [`subscribe`](Self::subscribe).
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    status: Arc<StatusBus<PlaybackStatus>>,
    events: EventBus,
}

impl ControllerHandle {
    /// Request playback of `url`, superseding any running stream.
    ///
    /// A blank `url` is handled like [`stop`](Self::stop).
    pub async fn play(&self, url: impl Into<String>, name: impl Into<String>) -> Result<()> {
        let name = metadata::normalize(Some(&name.into()));
        self.send(Command::Play {
            url: url.into(),
            name,
        })
        .await
    }

    /// Stop playback. Idempotent.
    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Route a notification action invoked by the host.
    ///
    /// The Stop action goes through the same path as [`stop`](Self::stop).
    /// Unknown action ids are ignored.
    pub async fn handle_action(&self, action_id: &str) -> Result<()> {
        if action_id == STOP_ACTION_ID {
            self.stop().await
        } else {
            debug!(action_id, "ignoring unknown notification action");
            Ok(())
        }
    }

    /// The current status snapshot.
    pub fn status(&self) -> PlaybackStatus {
        self.status.current()
    }

    /// Observe status changes. The stream starts at the current value.
    pub fn subscribe(&self) -> StatusStream<PlaybackStatus> {
        self.status.subscribe()
    }

    /// Discrete session events emitted after this call.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// Release any engine, withdraw the notification and end the controller
    /// task. Resolves once teardown finished. Calling it again after the
    /// controller ended returns `ControllerClosed`.
    pub async fn shutdown(&self) -> Result<()> {
        let (done, ack) = oneshot::channel();
        self.send(Command::Shutdown { done }).await?;
        ack.await.map_err(|_| PlaybackError::ControllerClosed)
    }

    /// Whether the controller task is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::ControllerClosed)
    }
}

impl std::fmt::Debug for ControllerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("state", &self.status.current().state)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Playback session state machine.
pub struct SessionController {
    engine: Arc<dyn StreamEngine>,
    host: Arc<dyn ProcessHost>,
    presenter: NotificationPresenter,
    status: Arc<StatusBus<PlaybackStatus>>,
    events: EventBus,
    session: Option<Session>,
    generations: Generation,
    engine_queue: mpsc::UnboundedSender<EngineEnvelope>,
}

impl SessionController {
    /// Build a controller in `Idle` and run it on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(config: &RadioConfig) -> ControllerHandle {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size);
        let (engine_tx, engine_rx) = mpsc::unbounded_channel();

        let status = Arc::new(StatusBus::new(PlaybackStatus::idle()));
        let events = EventBus::new(config.event_buffer_size);

        let controller = SessionController {
            engine: config.engine.clone(),
            host: config.process_host.clone(),
            presenter: NotificationPresenter::new(
                config.notifications.clone(),
                config.notification.clone(),
            ),
            status: status.clone(),
            events: events.clone(),
            session: None,
            generations: Generation::default(),
            engine_queue: engine_tx,
        };

        tokio::spawn(controller.run(command_rx, engine_rx));

        ControllerHandle {
            commands: command_tx,
            status,
            events,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut engine_events: mpsc::UnboundedReceiver<EngineEnvelope>,
    ) {
        debug!("session controller started");

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Play { url, name }) => self.play(url, name).await,
                    Some(Command::Stop) => self.stop().await,
                    Some(Command::Shutdown { done }) => {
                        self.teardown().await;
                        let _ = done.send(());
                        break;
                    }
                    None => {
                        debug!("all controller handles dropped");
                        self.teardown().await;
                        break;
                    }
                },
                Some(envelope) = engine_events.recv() => self.on_engine_event(envelope).await,
            }
        }

        debug!("session controller stopped");
    }

    fn current(&self) -> PlaybackStatus {
        self.status.current()
    }

    fn live_generation(&self) -> Option<Generation> {
        self.session.as_ref().map(Session::generation)
    }

    fn notification_id(&self) -> NotificationId {
        self.presenter.settings().id
    }

    /// Publish `status` and bring the notification in line with it.
    async fn transition(&mut self, status: PlaybackStatus) {
        let previous = self.current().state;
        if previous != status.state {
            info!(from = %previous, to = %status.state, "playback state changed");
        }
        self.status.publish(status.clone());
        self.presenter.present(&status).await;
    }

    async fn request_process_stop(&mut self) {
        if let Err(err) = self.host.request_stop().await {
            warn!(error = %err, "process host refused stop request");
        }
    }

    #[instrument(skip(self, name), fields(url = %redact_url(&url)))]
    async fn play(&mut self, url: String, name: Option<String>) {
        let url = url.trim().to_string();
        if url.is_empty() {
            let err = PlaybackError::InvalidRequest("stream URL is blank".to_string());
            log_playback_error(&err, "play request rejected");
            self.reject_play().await;
            return;
        }

        if let Some(previous) = self.session.take() {
            info!(
                generation = %previous.generation(),
                url = %redact_url(previous.url()),
                stream_name = ?previous.name(),
                "superseding running stream"
            );
            previous.release();
        }

        let generation = self.generations.advance();
        info!(%generation, stream_name = ?name, "starting stream");

        // Foreground presentation starts before the engine exists, so no
        // engine event can reach a notification that was never shown.
        self.transition(PlaybackStatus::starting(name.clone())).await;
        if let Err(err) = self.host.enter_foreground(self.notification_id()).await {
            warn!(error = %err, "failed to enter foreground");
        }

        let sink = TaggedEventSink::new(generation, self.engine_queue.clone());
        match self.engine.open(&url, sink) {
            Ok(handle) => {
                self.session = Some(Session::new(generation, url, name.clone(), handle));
                self.events.emit(SessionEvent::Started {
                    generation: generation.value(),
                    stream_name: name,
                });
            }
            Err(err) => {
                let failure = PlaybackError::EngineFailure(err.to_string());
                log_playback_error(&failure, "engine failed to open stream");
                self.fail(generation, err.to_string()).await;
            }
        }
    }

    #[instrument(skip(self), fields(generation = ?self.live_generation()))]
    async fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            self.stop_session(session).await;
            return;
        }

        let current = self.current();
        match current.state {
            PlaybackState::Idle | PlaybackState::Stopped => {
                debug!(state = %current.state, "nothing to stop");
            }
            _ => {
                self.transition(current.to_stopped()).await;
                self.events.emit(SessionEvent::Stopped { generation: None });
            }
        }
    }

    /// Full teardown of a live session: release, publish Stopped, withdraw
    /// the notification and ask the host to stop.
    async fn stop_session(&mut self, session: Session) {
        let generation = session.generation();
        session.release();
        let stopped = self.current().to_stopped();
        self.transition(stopped).await;
        self.request_process_stop().await;
        self.events.emit(SessionEvent::Stopped {
            generation: Some(generation.value()),
        });
    }

    /// A play request that cannot start a stream ends in Stopped, from any
    /// state. No engine handle is created.
    async fn reject_play(&mut self) {
        if let Some(session) = self.session.take() {
            self.stop_session(session).await;
            return;
        }

        let current = self.current();
        if current.state != PlaybackState::Stopped {
            self.transition(current.to_stopped()).await;
            self.events.emit(SessionEvent::Stopped { generation: None });
        }
    }

    /// Terminal error for the session tagged `generation`. The caller has
    /// already taken the session out of `self.session`.
    async fn fail(&mut self, generation: Generation, message: String) {
        let failed = self.current().to_error(message.clone());
        self.transition(failed).await;
        self.request_process_stop().await;
        self.events.emit(SessionEvent::Failed {
            generation: generation.value(),
            message,
        });
    }

    #[instrument(
        skip(self, envelope),
        fields(generation = %envelope.generation, event = envelope.event.kind())
    )]
    async fn on_engine_event(&mut self, envelope: EngineEnvelope) {
        let EngineEnvelope { generation, event } = envelope;

        if self.live_generation() != Some(generation) {
            let stale = PlaybackError::StaleEventDiscarded {
                generation: generation.value(),
                current: self.live_generation().map(|g| g.value()),
            };
            log_playback_error(&stale, "engine event dropped");
            return;
        }

        match event {
            EngineEvent::Buffering => {
                debug!(%generation, "engine buffering");
                let buffering = self.current().to_buffering();
                self.transition(buffering).await;
            }
            EngineEvent::Ready => {
                debug!(%generation, "engine ready");
            }
            EngineEvent::PlayingChanged(true) => {
                let playing = self.current().to_playing();
                self.transition(playing).await;
                self.events.emit(SessionEvent::Playing {
                    generation: generation.value(),
                });
            }
            EngineEvent::PlayingChanged(false) => {
                // No paused state exists; the engine follows up with
                // buffering, ended or error if playback really stalled.
                debug!(%generation, state = %self.current().state, "engine reports not playing");
            }
            EngineEvent::Ended => self.on_ended(generation).await,
            EngineEvent::Error(message) => {
                if let Some(session) = self.session.take() {
                    session.release();
                }
                let failure = PlaybackError::EngineFailure(message.clone());
                log_playback_error(&failure, "stream failed");
                self.fail(generation, message).await;
            }
            EngineEvent::MetadataChanged(meta) => self.on_metadata(generation, meta).await,
        }
    }

    async fn on_ended(&mut self, generation: Generation) {
        info!(%generation, "stream ended");
        if let Some(session) = self.session.take() {
            session.release();
        }
        let stopped = self.current().to_stopped();
        self.transition(stopped).await;
        self.events.emit(SessionEvent::Ended {
            generation: generation.value(),
        });
        self.request_process_stop().await;
    }

    async fn on_metadata(&mut self, generation: Generation, meta: StreamMetadata) {
        let current = self.current();
        if !current.is_active() {
            debug!(%generation, state = %current.state, "ignoring metadata outside a session");
            return;
        }

        let track = metadata::extract(&meta, current.stream_name.as_deref());
        let next = current.with_track(track.artist, track.title, track.stream_name);
        if next == current {
            return;
        }

        debug!(
            %generation,
            artist = ?next.artist,
            title = ?next.title,
            stream_name = ?next.stream_name,
            "stream metadata changed"
        );

        self.status.publish(next.clone());
        if next.state == PlaybackState::Playing {
            self.presenter.present(&next).await;
        }
    }

    /// Process teardown: release the engine and withdraw the notification.
    async fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            let generation = session.generation();
            session.release();
            self.status.publish(self.current().to_stopped());
            self.events.emit(SessionEvent::Stopped {
                generation: Some(generation.value()),
            });
        }
        self.presenter.withdraw().await;
    }
}

/// Log `err` at the level its class calls for: engine failures as errors,
/// rejected requests and stale events at debug, anything else as a warning.
fn log_playback_error(err: &PlaybackError, context: &str) {
    if err.is_engine_failure() {
        error!(error = %err, "{}", context);
    } else if err.is_silent() {
        debug!(error = %err, "{}", context);
    } else {
        warn!(error = %err, "{}", context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::{
        EngineEventSink, EngineHandle, NotificationAction, NotificationContent, NotificationSurface,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Default)]
    struct StubEngine {
        opened: AtomicUsize,
        fail_with: Option<String>,
        sink: Mutex<Option<Arc<dyn EngineEventSink>>>,
    }

    struct StubHandle;

    impl EngineHandle for StubHandle {
        fn release(&mut self) {}
    }

    impl StreamEngine for StubEngine {
        fn open(
            &self,
            _url: &str,
            sink: Arc<dyn EngineEventSink>,
        ) -> BridgeResult<Box<dyn EngineHandle>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.fail_with {
                return Err(BridgeError::OperationFailed(message.clone()));
            }
            *self.sink.lock().unwrap() = Some(sink);
            Ok(Box::new(StubHandle))
        }
    }

    struct QuietSurface;

    #[async_trait]
    impl NotificationSurface for QuietSurface {
        async fn show(
            &self,
            _id: NotificationId,
            _content: NotificationContent,
            _actions: Vec<NotificationAction>,
        ) -> BridgeResult<()> {
            Ok(())
        }

        async fn update(&self, _id: NotificationId, _content: NotificationContent) -> BridgeResult<()> {
            Ok(())
        }

        async fn withdraw(&self, _id: NotificationId) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct QuietHost;

    #[async_trait]
    impl ProcessHost for QuietHost {
        async fn enter_foreground(&self, _notification: NotificationId) -> BridgeResult<()> {
            Ok(())
        }

        async fn request_stop(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn spawn_with(engine: Arc<StubEngine>) -> ControllerHandle {
        let config = RadioConfig::builder()
            .engine(engine)
            .notifications(Arc::new(QuietSurface))
            .process_host(Arc::new(QuietHost))
            .build()
            .unwrap();
        SessionController::spawn(&config)
    }

    async fn wait_for_state(handle: &ControllerHandle, state: PlaybackState) -> PlaybackStatus {
        let mut stream = handle.subscribe();
        tokio::time::timeout(Duration::from_secs(1), stream.wait_for(|s| s.state == state))
            .await
            .expect("timed out waiting for state")
            .expect("status bus closed")
    }

    #[tokio::test]
    async fn starts_idle() {
        let handle = spawn_with(Arc::new(StubEngine::default()));
        assert_eq!(handle.status(), PlaybackStatus::idle());
        assert!(handle.is_running());
    }

    #[tokio::test]
    async fn play_enters_buffering_with_name() {
        let engine = Arc::new(StubEngine::default());
        let handle = spawn_with(engine.clone());

        handle.play(" http://radio/live ", " Jazz ").await.unwrap();
        let status = wait_for_state(&handle, PlaybackState::Buffering).await;

        assert_eq!(status.stream_name.as_deref(), Some("Jazz"));
        assert_eq!(engine.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn open_failure_is_an_error_state() {
        let engine = Arc::new(StubEngine {
            fail_with: Some("unsupported scheme".into()),
            ..Default::default()
        });
        let handle = spawn_with(engine);
        let mut failures = handle
            .events()
            .filter(|e| matches!(e, SessionEvent::Failed { .. }));

        handle.play("ftp://radio", "R").await.unwrap();
        let status = wait_for_state(&handle, PlaybackState::Error).await;

        assert!(status
            .error_message
            .as_deref()
            .unwrap()
            .contains("unsupported scheme"));
        assert!(matches!(
            failures.recv().await.unwrap(),
            SessionEvent::Failed { generation: 1, .. }
        ));
    }

    #[tokio::test]
    async fn ready_alone_keeps_buffering() {
        let engine = Arc::new(StubEngine::default());
        let handle = spawn_with(engine.clone());

        handle.play("http://radio/live", "R").await.unwrap();
        wait_for_state(&handle, PlaybackState::Buffering).await;

        let sink = engine.sink.lock().unwrap().clone().unwrap();
        sink.emit(EngineEvent::Ready);
        sink.emit(EngineEvent::PlayingChanged(false));
        sink.emit(EngineEvent::MetadataChanged(StreamMetadata::track("A", "T")));

        let mut stream = handle.subscribe();
        let status = tokio::time::timeout(
            Duration::from_secs(1),
            stream.wait_for(|s| s.title.is_some()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(status.state, PlaybackState::Buffering);
        assert_eq!(status.artist.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn unknown_action_is_ignored() {
        let engine = Arc::new(StubEngine::default());
        let handle = spawn_with(engine.clone());

        handle.play("http://radio/live", "R").await.unwrap();
        wait_for_state(&handle, PlaybackState::Buffering).await;

        handle.handle_action("pause").await.unwrap();
        handle.handle_action(STOP_ACTION_ID).await.unwrap();
        let status = wait_for_state(&handle, PlaybackState::Stopped).await;
        assert_eq!(status.stream_name.as_deref(), Some("R"));
        assert_eq!(engine.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_while_idle_is_a_no_op() {
        let handle = spawn_with(Arc::new(StubEngine::default()));
        let mut events = handle.events();

        handle.stop().await.unwrap();
        handle.handle_action(STOP_ACTION_ID).await.unwrap();
        // Commands are handled in order: once shutdown is acknowledged both
        // stops have been processed.
        handle.shutdown().await.unwrap();

        assert_eq!(handle.status(), PlaybackStatus::idle());
        assert!(
            tokio::time::timeout(Duration::from_millis(100), events.recv())
                .await
                .is_err(),
            "stop while idle emitted a session event"
        );
    }

    struct LevelRecorder(Arc<Mutex<Vec<tracing::Level>>>);

    impl<S: tracing::Subscriber> Layer<S> for LevelRecorder {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn playback_errors_are_logged_at_their_class_level() {
        let levels = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(LevelRecorder(levels.clone()));

        tracing::subscriber::with_default(subscriber, || {
            log_playback_error(
                &PlaybackError::StaleEventDiscarded {
                    generation: 1,
                    current: Some(2),
                },
                "engine event dropped",
            );
            log_playback_error(
                &PlaybackError::InvalidRequest("stream URL is blank".into()),
                "play request rejected",
            );
            log_playback_error(&PlaybackError::EngineFailure("HTTP 500".into()), "stream failed");
            log_playback_error(&PlaybackError::ControllerClosed, "controller closed");
        });

        assert_eq!(
            *levels.lock().unwrap(),
            vec![
                tracing::Level::DEBUG,
                tracing::Level::DEBUG,
                tracing::Level::ERROR,
                tracing::Level::WARN,
            ]
        );
    }

    #[tokio::test]
    async fn commands_fail_after_shutdown() {
        let handle = spawn_with(Arc::new(StubEngine::default()));
        handle.shutdown().await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while handle.is_running() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert!(matches!(
            handle.play("http://radio", "R").await,
            Err(PlaybackError::ControllerClosed)
        ));
    }
}
