//! In-memory stand-ins for the vendor and the token endpoint.

use crate::access::AccessTokenSource;
use crate::backend::{AvatarBackend, SessionInfo, SessionRequest, StreamEndpoint};
use crate::error::AvatarError;
use async_trait::async_trait;
use newsdesk_types::Utterance;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Always hands out the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenSource(pub String);

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn fetch(&self) -> Result<String, AvatarError> {
        Ok(self.0.clone())
    }
}

/// A call observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Create { access_token: String, request: SessionRequest },
    Start(String),
    Speak(String, Utterance),
    Interrupt(String),
    Stop(String),
    StartListening(String),
    StopListening(String),
}

/// Records every call and succeeds unless told to fail.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    sessions: AtomicUsize,
    fail_start: AtomicBool,
    fail_speak: AtomicBool,
    closed: AtomicBool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn fail_speak(&self, fail: bool) {
        self.fail_speak.store(fail, Ordering::SeqCst);
    }

    /// Simulates the vendor dropping the current session: calls on it fail
    /// with 404 until a new session is created.
    pub fn close_session(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn ensure_open(&self) -> Result<(), AvatarError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AvatarError::Vendor {
                status: 404,
                message: "session not found".to_string(),
            });
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Texts passed to `speak`, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Speak(_, utterance) => Some(utterance.text),
                _ => None,
            })
            .collect()
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    fn record(&self, call: BackendCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl AvatarBackend for RecordingBackend {
    async fn create_session(
        &self,
        access_token: &str,
        request: &SessionRequest,
    ) -> Result<SessionInfo, AvatarError> {
        self.closed.store(false, Ordering::SeqCst);
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(BackendCall::Create {
            access_token: access_token.to_string(),
            request: request.clone(),
        });
        Ok(SessionInfo {
            session_id: format!("session-{n}"),
            access_token: access_token.to_string(),
            stream: StreamEndpoint {
                url: format!("wss://stream.test/session-{n}"),
                access_token: format!("stream-token-{n}"),
            },
        })
    }

    async fn start_session(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.record(BackendCall::Start(session.session_id.clone()));
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(AvatarError::Vendor {
                status: 500,
                message: "start failed".to_string(),
            });
        }
        Ok(())
    }

    async fn speak(
        &self,
        session: &SessionInfo,
        utterance: &Utterance,
    ) -> Result<(), AvatarError> {
        self.ensure_open()?;
        if self.fail_speak.load(Ordering::SeqCst) {
            return Err(AvatarError::Vendor {
                status: 400,
                message: "speak failed".to_string(),
            });
        }
        self.record(BackendCall::Speak(
            session.session_id.clone(),
            utterance.clone(),
        ));
        Ok(())
    }

    async fn interrupt(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.ensure_open()?;
        self.record(BackendCall::Interrupt(session.session_id.clone()));
        Ok(())
    }

    async fn stop(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.record(BackendCall::Stop(session.session_id.clone()));
        Ok(())
    }

    async fn start_listening(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.ensure_open()?;
        self.record(BackendCall::StartListening(session.session_id.clone()));
        Ok(())
    }

    async fn stop_listening(&self, session: &SessionInfo) -> Result<(), AvatarError> {
        self.ensure_open()?;
        self.record(BackendCall::StopListening(session.session_id.clone()));
        Ok(())
    }
}
