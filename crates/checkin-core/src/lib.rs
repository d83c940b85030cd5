pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod render;
pub mod state;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types for convenience
pub use client::{
    ChatExchanger, ConnectionStatus, ConversationClient, Delay, RetryPolicy, StartFetcher,
    StartOutcome, TokioDelay, APOLOGY, GREETING,
};
pub use config::Config;
pub use error::{ExchangeError, FailureKind};
pub use protocol::{ChatRequest, ChatResponse, RawResponse};
pub use render::{MessageLog, Renderer};
pub use state::{ChatMessage, ChatRole, ConversationState};
pub use transport::{HttpTransport, Transport};
