use crate::backend::StreamEndpoint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle to a live avatar media stream.
///
/// Clones share liveness: once the owning session ends, every clone
/// reports `!is_live()` and the playback surface must detach.
#[derive(Debug, Clone)]
pub struct MediaStream {
    session_id: String,
    endpoint: StreamEndpoint,
    live: Arc<AtomicBool>,
}

impl MediaStream {
    pub(crate) fn new(session_id: impl Into<String>, endpoint: StreamEndpoint) -> Self {
        Self {
            session_id: session_id.into(),
            endpoint,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Connection details, or `None` once the stream was released.
    pub fn endpoint(&self) -> Option<&StreamEndpoint> {
        self.is_live().then_some(&self.endpoint)
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub(crate) fn release(&self) {
        self.live.store(false, Ordering::Release);
    }
}
