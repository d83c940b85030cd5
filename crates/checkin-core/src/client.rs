//! Conversation client
//!
//! Owns the conversation state that is echoed to the backend on every turn and
//! decides what the user sees when an exchange succeeds or fails. Network work
//! is split from state changes: [`StartFetcher`] and [`ChatExchanger`] are cheap
//! clones that can run on a spawned task, and their results are folded back in
//! with [`ConversationClient::apply_start`] and [`ConversationClient::apply_reply`].
//! Replies are applied in arrival order, so with overlapping sends the last
//! reply to arrive decides the state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::ExchangeError;
use crate::protocol::{classify, classify_json, ChatRequest, ChatResponse, CHAT_PATH, START_PATH};
use crate::render::Renderer;
use crate::state::{ChatRole, ConversationState};
use crate::transport::Transport;

pub const GREETING: &str = "Hello! I'm your virtual mental health assistant. Please, tell me a little about how you've been feeling lately.";
pub const APOLOGY: &str = "Sorry, I'm having trouble connecting. Please try again later.";

/// Waits between startup attempts. Swapped out in tests so retries run instantly.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry policy for `GET /start` when an interstitial page comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed wait between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Offline,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Offline => "offline",
        }
    }
}

/// Result of the startup sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct StartOutcome {
    pub attempts: u32,
    pub result: Result<ChatResponse, ExchangeError>,
}

/// Runs the bounded `GET /start` loop. Attempts are strictly sequential.
#[derive(Clone)]
pub struct StartFetcher {
    transport: Arc<dyn Transport>,
    delay: Arc<dyn Delay>,
    policy: RetryPolicy,
}

impl StartFetcher {
    pub async fn fetch(&self) -> StartOutcome {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = match self.transport.get(START_PATH).await {
                Ok(raw) => classify(&raw),
                Err(err) => Err(err),
            };

            match result {
                Err(err) if err.kind().is_retryable() && attempts < self.policy.max_attempts => {
                    warn!(
                        attempt = attempts,
                        max_attempts = self.policy.max_attempts,
                        backoff_ms = self.policy.backoff.as_millis() as u64,
                        "{err}, retrying /start"
                    );
                    self.delay.sleep(self.policy.backoff).await;
                }
                result => return StartOutcome { attempts, result },
            }
        }
    }
}

/// Performs one `POST /chat` round trip.
#[derive(Clone)]
pub struct ChatExchanger {
    transport: Arc<dyn Transport>,
}

impl ChatExchanger {
    pub async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse, ExchangeError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ExchangeError::Malformed(e.to_string()))?;
        let raw = self.transport.post_json(CHAT_PATH, &body).await?;
        classify_json(&raw)
    }
}

pub struct ConversationClient {
    transport: Arc<dyn Transport>,
    delay: Arc<dyn Delay>,
    policy: RetryPolicy,
    current_state: ConversationState,
    retry_count: u32,
    status: ConnectionStatus,
}

impl ConversationClient {
    pub fn new(transport: Arc<dyn Transport>, delay: Arc<dyn Delay>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            delay,
            policy,
            current_state: ConversationState::bootstrap(),
            retry_count: 0,
            status: ConnectionStatus::Connecting,
        }
    }

    pub fn current_state(&self) -> &ConversationState {
        &self.current_state
    }

    /// Retries spent by the last startup sequence. Zero after a successful parse.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn start_fetcher(&self) -> StartFetcher {
        StartFetcher {
            transport: Arc::clone(&self.transport),
            delay: Arc::clone(&self.delay),
            policy: self.policy,
        }
    }

    pub fn exchanger(&self) -> ChatExchanger {
        ChatExchanger {
            transport: Arc::clone(&self.transport),
        }
    }

    /// Show the greeting and install the bootstrap state so the conversation is
    /// usable before the backend answers, or if it never does.
    pub fn begin(&mut self, renderer: &mut impl Renderer) {
        renderer.display(GREETING, ChatRole::Bot);
        self.current_state = ConversationState::bootstrap();
        self.status = ConnectionStatus::Connecting;
    }

    pub fn apply_start(&mut self, outcome: StartOutcome, renderer: &mut impl Renderer) {
        match outcome.result {
            Ok(response) => {
                info!(attempts = outcome.attempts, "conversation started");
                self.retry_count = 0;
                renderer.display(&response.reply, ChatRole::Bot);
                self.current_state = response.new_state;
                self.status = ConnectionStatus::Connected;
            }
            Err(err) => {
                // The greeting already covers the UI, so this stays out of the chat.
                warn!(
                    attempts = outcome.attempts,
                    kind = ?err.kind(),
                    "could not start conversation: {err}"
                );
                self.retry_count = outcome.attempts.saturating_sub(1);
                self.status = ConnectionStatus::Offline;
            }
        }
    }

    /// Full startup: greeting, then the `/start` sequence inline.
    pub async fn initialize(&mut self, renderer: &mut impl Renderer) {
        self.begin(renderer);
        let outcome = self.start_fetcher().fetch().await;
        self.apply_start(outcome, renderer);
    }

    /// Display the user's message and snapshot the request to send.
    /// Blank input displays nothing and yields `None`.
    pub fn prepare_send(&mut self, input: &str, renderer: &mut impl Renderer) -> Option<ChatRequest> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }

        renderer.display(message, ChatRole::User);
        Some(ChatRequest {
            message: message.to_string(),
            state: self.current_state.clone(),
        })
    }

    pub fn apply_reply(
        &mut self,
        result: Result<ChatResponse, ExchangeError>,
        renderer: &mut impl Renderer,
    ) {
        match result {
            Ok(response) => {
                renderer.display(&response.reply, ChatRole::Bot);
                self.current_state = response.new_state;
                self.status = ConnectionStatus::Connected;
            }
            Err(err) => {
                warn!(kind = ?err.kind(), "chat exchange failed: {err}");
                renderer.display(APOLOGY, ChatRole::Bot);
                self.status = ConnectionStatus::Offline;
            }
        }
    }

    /// One full turn, inline.
    pub async fn send(&mut self, input: &str, renderer: &mut impl Renderer) {
        if let Some(request) = self.prepare_send(input, renderer) {
            let result = self.exchanger().exchange(&request).await;
            self.apply_reply(result, renderer);
        }
    }
}
