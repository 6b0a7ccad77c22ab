//! Session lifecycle state machine.
//!
//! Transitions are a pure function of the current state and a typed event,
//! so the controller never has to reason about vendor callbacks directly.

use newsdesk_types::AvatarEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session has been started yet.
    #[default]
    Idle,
    /// Access token and vendor session are being set up.
    Starting,
    /// Stream is live and the avatar is silent.
    Ready,
    /// Stream is live and the avatar is talking.
    Speaking,
    /// Session was ended or the vendor disconnected. Terminal until restarted.
    Ended,
}

impl SessionState {
    /// Whether a vendor session exists and accepts speech.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Ready | Self::Speaking)
    }

    /// Computes the state after `event`.
    ///
    /// Returns `None` when the event is not valid in this state.
    pub fn next(self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (_, E::Disconnected) => Some(S::Ended),
            (S::Idle | S::Ended, E::Start) => Some(S::Starting),
            (S::Starting | S::Ready, E::StreamReady) => Some(S::Ready),
            (S::Starting, E::StartFailed) => Some(S::Idle),
            (S::Ready | S::Speaking, E::TalkStarted) => Some(S::Speaking),
            (S::Ready | S::Speaking, E::TalkStopped) => Some(S::Ready),
            (S::Starting | S::Ready | S::Speaking, E::End) => Some(S::Ended),
            _ => None,
        }
    }
}

/// Inputs to the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Start,
    StreamReady,
    StartFailed,
    TalkStarted,
    TalkStopped,
    End,
    Disconnected,
}

impl SessionEvent {
    /// Maps a vendor playback event onto a lifecycle event.
    ///
    /// User voice-activity events do not affect the session lifecycle.
    pub fn from_avatar(event: &AvatarEvent) -> Option<Self> {
        match event {
            AvatarEvent::StreamReady => Some(Self::StreamReady),
            AvatarEvent::StreamDisconnected => Some(Self::Disconnected),
            AvatarEvent::AvatarStartTalking => Some(Self::TalkStarted),
            AvatarEvent::AvatarStopTalking => Some(Self::TalkStopped),
            AvatarEvent::UserStartTalking | AvatarEvent::UserStopTalking => None,
        }
    }
}
