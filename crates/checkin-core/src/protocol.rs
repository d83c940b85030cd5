//! Wire types for the `/start` and `/chat` endpoints and response classification.

use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;
use crate::state::ConversationState;

pub const START_PATH: &str = "/start";
pub const CHAT_PATH: &str = "/chat";

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub state: ConversationState,
}

/// Body returned by both endpoints on success
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(rename = "newState")]
    pub new_state: ConversationState,
}

/// A response as the transport saw it, with the body still unparsed so it
/// can be inspected before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Media type without parameters, lowercased.
    fn media_type(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
    }

    fn is_html(&self) -> bool {
        self.media_type().as_deref() == Some("text/html") || looks_like_html(&self.body)
    }
}

/// True when the body is an HTML document rather than an API payload.
/// Only a document marker at the very start counts, so markup quoted inside
/// a JSON string is not mistaken for a page.
pub fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(14).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// Classification for `/start`: the body is sniffed, whatever the declared type.
pub fn classify(raw: &RawResponse) -> Result<ChatResponse, ExchangeError> {
    if !raw.is_success() {
        return Err(ExchangeError::Status(raw.status));
    }
    if raw.is_html() {
        return Err(ExchangeError::Interstitial);
    }
    serde_json::from_str(&raw.body).map_err(|e| ExchangeError::Malformed(e.to_string()))
}

/// Classification for `/chat`: like [`classify`], but the response must also
/// declare `application/json`.
pub fn classify_json(raw: &RawResponse) -> Result<ChatResponse, ExchangeError> {
    if !raw.is_success() {
        return Err(ExchangeError::Status(raw.status));
    }
    if raw.is_html() {
        return Err(ExchangeError::Interstitial);
    }
    match raw.media_type().as_deref() {
        Some("application/json") => classify(raw),
        other => Err(ExchangeError::Malformed(format!(
            "expected application/json, got {}",
            other.unwrap_or("no content type")
        ))),
    }
}
