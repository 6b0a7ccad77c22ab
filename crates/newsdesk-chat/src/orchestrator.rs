use crate::client::{ChatClient, HistoryEntry, Role};
use crate::config::{ChatConfig, HistoryMode};
use crate::error::ChatError;
use crate::reply::ReplyPolicy;
use newsdesk_auth::TokenManager;
use newsdesk_avatar::SessionController;
use newsdesk_types::{TaskType, Utterance};
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Runs chat turns: user text in, avatar speech out.
pub struct Orchestrator {
    chat: ChatClient,
    tokens: Arc<TokenManager>,
    avatar: Arc<SessionController>,
    policy: ReplyPolicy,
    acknowledgements: Vec<String>,
    history_mode: HistoryMode,
    history: Mutex<Vec<HistoryEntry>>,
    /// Number of the most recently started turn.
    latest_turn: AtomicU64,
}

impl Orchestrator {
    pub fn new(
        config: &ChatConfig,
        tokens: Arc<TokenManager>,
        avatar: Arc<SessionController>,
    ) -> Result<Self, ChatError> {
        Ok(Self {
            chat: ChatClient::new(
                config.endpoint.clone(),
                Duration::from_secs(config.timeout_secs),
            )?,
            tokens,
            avatar,
            policy: ReplyPolicy::new(&config.reply)?,
            acknowledgements: config
                .acknowledgements
                .iter()
                .filter(|a| !a.trim().is_empty())
                .cloned()
                .collect(),
            history_mode: config.history,
            history: Mutex::new(Vec::new()),
            latest_turn: AtomicU64::new(0),
        })
    }

    pub fn avatar(&self) -> &Arc<SessionController> {
        &self.avatar
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Asks the chat backend and has the avatar speak the answer.
    ///
    /// Blank input is rejected before any network call. If no avatar session
    /// is live, one is started first. The reply is spoken only if no newer
    /// turn has started in the meantime.
    pub async fn ask(&self, text: &str) -> Result<Utterance, ChatError> {
        let message = text.trim();
        if message.is_empty() {
            debug!("ignoring empty message");
            return Err(ChatError::EmptyMessage);
        }

        let turn = self.latest_turn.fetch_add(1, Ordering::SeqCst) + 1;
        self.run_turn(turn, message)
            .instrument(info_span!("turn", turn))
            .await
    }

    async fn run_turn(&self, turn: u64, message: &str) -> Result<Utterance, ChatError> {
        if !self.avatar.is_active() {
            info!("no active avatar session, starting one");
            self.avatar.start_session().await?;
        }

        self.acknowledge().await;

        let token = self.tokens.get_token().await?;
        let history = self.history_snapshot();

        let raw = match self.chat.send(&token, message, &history).await {
            Err(ChatError::Remote { status: 401 }) => {
                // The backend no longer accepts this token; make the next turn re-authenticate.
                if let Err(e) = self.tokens.invalidate() {
                    warn!("failed to drop rejected token: {}", e);
                }
                return Err(ChatError::Remote { status: 401 });
            }
            other => other?,
        };

        let reply = self.policy.apply(&raw);
        if reply.is_empty() {
            warn!("reply was empty after post-processing");
            return Err(ChatError::EmptyReply);
        }

        if self.latest_turn.load(Ordering::SeqCst) != turn {
            warn!("dropping reply for superseded turn");
            return Err(ChatError::Superseded { turn });
        }

        info!(chars = reply.len(), "speaking reply");
        self.avatar.speak(&reply, TaskType::Repeat).await?;
        self.record_turn(message, &reply);

        Ok(Utterance::repeat(reply))
    }

    /// Speaks a random filler phrase while the reply is pending.
    async fn acknowledge(&self) {
        let phrase = self
            .acknowledgements
            .choose(&mut rand::thread_rng())
            .cloned();
        if let Some(phrase) = phrase {
            if let Err(e) = self.avatar.speak(&phrase, TaskType::Repeat).await {
                warn!("failed to speak acknowledgement: {}", e);
            }
        }
    }

    fn history_snapshot(&self) -> Vec<HistoryEntry> {
        match self.history_mode {
            HistoryMode::Stateless => Vec::new(),
            HistoryMode::Accumulate => self
                .history
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }

    fn record_turn(&self, message: &str, reply: &str) {
        if self.history_mode == HistoryMode::Stateless {
            return;
        }
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push(HistoryEntry {
            role: Role::User,
            content: message.to_string(),
        });
        history.push(HistoryEntry {
            role: Role::Assistant,
            content: reply.to_string(),
        });
    }

    /// Forgets accumulated history.
    pub fn reset_history(&self) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("chat", &self.chat)
            .field("history_mode", &self.history_mode)
            .field("latest_turn", &self.latest_turn.load(Ordering::SeqCst))
            .finish()
    }
}
