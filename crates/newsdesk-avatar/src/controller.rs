use crate::access::{AccessTokenSource, HttpAccessTokenSource};
use crate::backend::{AvatarBackend, SessionInfo, SessionRequest};
use crate::config::AvatarConfig;
use crate::error::AvatarError;
use crate::media::MediaStream;
use crate::state::{SessionEvent, SessionState};
use crate::streaming::StreamingApiBackend;
use newsdesk_types::{AvatarEvent, TaskType, Utterance};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

/// Capacity of the avatar event broadcast channel.
const EVENT_BROADCAST_CAPACITY: usize = 64;

struct Inner {
    state: SessionState,
    session: Option<SessionInfo>,
    stream: Option<MediaStream>,
}

impl Inner {
    fn apply(&mut self, event: SessionEvent) -> Result<SessionState, AvatarError> {
        let next = self
            .state
            .next(event)
            .ok_or(AvatarError::InvalidTransition {
                state: self.state,
                event,
            })?;
        debug!(from = ?self.state, to = ?next, ?event, "session transition");
        self.state = next;
        Ok(next)
    }

    fn live_session(&self) -> Option<&SessionInfo> {
        if self.state.is_live() {
            self.session.as_ref()
        } else {
            None
        }
    }
}

/// Owns at most one streaming avatar session.
///
/// All lifecycle operations serialize on an internal lock, so a session
/// cannot be started and ended concurrently.
pub struct SessionController {
    config: AvatarConfig,
    tokens: Arc<dyn AccessTokenSource>,
    backend: Arc<dyn AvatarBackend>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<SessionState>,
    stream_tx: watch::Sender<Option<MediaStream>>,
    events_tx: broadcast::Sender<AvatarEvent>,
}

impl SessionController {
    pub fn new(
        config: AvatarConfig,
        tokens: Arc<dyn AccessTokenSource>,
        backend: Arc<dyn AvatarBackend>,
    ) -> Result<Self, AvatarError> {
        config
            .voice
            .validate()
            .map_err(|e| AvatarError::Config(e.to_string()))?;
        if config.avatar_name.trim().is_empty() {
            return Err(AvatarError::Config("avatar name must not be empty".to_string()));
        }

        let (state_tx, _) = watch::channel(SessionState::Idle);
        let (stream_tx, _) = watch::channel(None);
        let (events_tx, _) = broadcast::channel(EVENT_BROADCAST_CAPACITY);

        Ok(Self {
            config,
            tokens,
            backend,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                session: None,
                stream: None,
            }),
            state_tx,
            stream_tx,
            events_tx,
        })
    }

    /// Builds a controller that talks to the vendor streaming API and the
    /// local token endpoint named in `config`.
    pub fn from_config(config: AvatarConfig) -> Result<Self, AvatarError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let tokens = Arc::new(HttpAccessTokenSource::new(
            config.token_endpoint.clone(),
            timeout,
        )?);
        let backend = Arc::new(StreamingApiBackend::new(config.base_url.clone(), timeout)?);
        Self::new(config, tokens, backend)
    }

    pub fn config(&self) -> &AvatarConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.state().is_live()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Playback surfaces watch this to attach and detach the video stream.
    pub fn watch_stream(&self) -> watch::Receiver<Option<MediaStream>> {
        self.stream_tx.subscribe()
    }

    pub fn media_stream(&self) -> Option<MediaStream> {
        self.stream_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AvatarEvent> {
        self.events_tx.subscribe()
    }

    pub async fn session_id(&self) -> Option<String> {
        let inner = self.inner.lock().await;
        inner.live_session().map(|s| s.session_id.clone())
    }

    fn publish_state(&self, state: SessionState) {
        self.state_tx.send_replace(state);
    }

    fn broadcast(&self, event: AvatarEvent) {
        // No subscribers is fine.
        let _ = self.events_tx.send(event);
    }

    fn release_stream(&self, inner: &mut Inner) {
        if let Some(stream) = inner.stream.take() {
            stream.release();
        }
        inner.session = None;
        self.stream_tx.send_replace(None);
    }

    /// Opens a session and returns once its stream is ready.
    ///
    /// If a session is already live it is returned unchanged.
    pub async fn start_session(&self) -> Result<SessionInfo, AvatarError> {
        let session = {
            let mut inner = self.inner.lock().await;
            if let Some(existing) = inner.live_session() {
                return Ok(existing.clone());
            }

            let state = inner.apply(SessionEvent::Start)?;
            self.publish_state(state);

            match self.open_session().await {
                Ok(session) => {
                    let state = inner.apply(SessionEvent::StreamReady)?;
                    let stream = MediaStream::new(&session.session_id, session.stream.clone());
                    inner.session = Some(session.clone());
                    inner.stream = Some(stream.clone());
                    self.stream_tx.send_replace(Some(stream));
                    self.publish_state(state);
                    self.broadcast(AvatarEvent::StreamReady);
                    info!(session_id = %session.session_id, "avatar stream ready");
                    session
                }
                Err(e) => {
                    warn!("failed to start avatar session: {}", e);
                    let state = inner.apply(SessionEvent::StartFailed)?;
                    self.publish_state(state);
                    return Err(e);
                }
            }
        };

        if let Some(greeting) = self.config.greeting.clone().filter(|g| !g.trim().is_empty()) {
            if let Err(e) = self.speak(&greeting, TaskType::Repeat).await {
                warn!("failed to speak greeting: {}", e);
            }
        }

        Ok(session)
    }

    async fn open_session(&self) -> Result<SessionInfo, AvatarError> {
        let access_token = self.tokens.fetch().await?;
        let request = SessionRequest {
            avatar_name: self.config.avatar_name.clone(),
            quality: self.config.quality,
            voice: self.config.voice.clone(),
        };
        let session = self.backend.create_session(&access_token, &request).await?;

        if let Err(e) = self.backend.start_session(&session).await {
            // Close the half-open vendor session.
            if let Err(stop_err) = self.backend.stop(&session).await {
                debug!("cleanup of unstarted session failed: {}", stop_err);
            }
            return Err(e);
        }
        Ok(session)
    }

    /// Submits text for the avatar to speak.
    ///
    /// # Errors
    ///
    /// [`AvatarError::NotInitialized`] when no session is live.
    pub async fn speak(&self, text: &str, task_type: TaskType) -> Result<(), AvatarError> {
        let mut inner = self.inner.lock().await;
        let Some(session) = inner.live_session() else {
            warn!("speak requested without an active avatar session");
            return Err(AvatarError::NotInitialized);
        };

        let utterance = Utterance {
            text: text.to_string(),
            task_type,
        };
        debug!(session_id = %session.session_id, chars = text.len(), "submitting utterance");
        let result = self.backend.speak(session, &utterance).await;
        self.detect_vendor_close(&mut inner, result)
    }

    /// Cancels in-progress speech.
    pub async fn interrupt(&self) -> Result<(), AvatarError> {
        let mut inner = self.inner.lock().await;
        let session = inner.live_session().ok_or(AvatarError::NotInitialized)?;
        let result = self.backend.interrupt(session).await;
        self.detect_vendor_close(&mut inner, result)
    }

    pub async fn start_listening(&self) -> Result<(), AvatarError> {
        let mut inner = self.inner.lock().await;
        let session = inner.live_session().ok_or(AvatarError::NotInitialized)?;
        let result = self.backend.start_listening(session).await;
        self.detect_vendor_close(&mut inner, result)
    }

    pub async fn stop_listening(&self) -> Result<(), AvatarError> {
        let mut inner = self.inner.lock().await;
        let session = inner.live_session().ok_or(AvatarError::NotInitialized)?;
        let result = self.backend.stop_listening(session).await;
        self.detect_vendor_close(&mut inner, result)
    }

    /// Treats a vendor "unknown session" answer as a disconnect, so the next
    /// caller starts a fresh session instead of reusing a dead one.
    fn detect_vendor_close(
        &self,
        inner: &mut Inner,
        result: Result<(), AvatarError>,
    ) -> Result<(), AvatarError> {
        if let Err(e) = &result {
            if e.is_session_gone() {
                warn!("vendor closed the avatar session: {}", e);
                self.release_stream(inner);
                if let Ok(state) = inner.apply(SessionEvent::Disconnected) {
                    self.publish_state(state);
                }
                self.broadcast(AvatarEvent::StreamDisconnected);
            }
        }
        result
    }

    /// Tears down the session and releases its media stream.
    ///
    /// The stream is released even when the vendor call fails; that failure
    /// is still returned.
    pub async fn end_session(&self) -> Result<(), AvatarError> {
        let mut inner = self.inner.lock().await;
        let session = inner
            .live_session()
            .cloned()
            .ok_or(AvatarError::NotInitialized)?;

        let stopped = self.backend.stop(&session).await;

        self.release_stream(&mut inner);
        let state = inner.apply(SessionEvent::End)?;
        self.publish_state(state);
        info!(session_id = %session.session_id, "avatar session ended");

        stopped
    }

    /// Feeds a vendor playback event into the session.
    ///
    /// Events that make no sense in the current state (for example a stray
    /// talk event after the session ended) are logged and dropped.
    pub async fn handle_event(&self, event: AvatarEvent) {
        let mut inner = self.inner.lock().await;

        if let Some(transition) = SessionEvent::from_avatar(&event) {
            match inner.apply(transition) {
                Ok(state) => {
                    if transition == SessionEvent::Disconnected {
                        info!("avatar stream disconnected");
                        self.release_stream(&mut inner);
                    }
                    self.publish_state(state);
                }
                Err(e) => {
                    warn!(event = event.name(), "ignoring avatar event: {}", e);
                    return;
                }
            }
        }

        self.broadcast(event);
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}
