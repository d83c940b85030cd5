use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::error::ExchangeError;
use crate::protocol::RawResponse;

/// Header that tells ngrok-style tunnels to skip their browser warning page.
pub const TUNNEL_WARNING_HEADER: &str = "ngrok-skip-browser-warning";

/// Moves requests to the backend and hands back the raw, unparsed response.
///
/// Implementations only ever fail with [`ExchangeError::Transport`]; status
/// and body classification happen in [`crate::protocol::classify`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<RawResponse, ExchangeError>;

    async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse, ExchangeError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    skip_tunnel_warning: bool,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration, skip_tunnel_warning: bool) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            skip_tunnel_warning,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(CONTENT_TYPE, "application/json");
        if self.skip_tunnel_warning {
            request.header(TUNNEL_WARNING_HEADER, "true")
        } else {
            request
        }
    }

    async fn read(response: Response) -> Result<RawResponse, ExchangeError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, ExchangeError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self.decorate(self.client.get(&url)).send().await?;
        Self::read(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse, ExchangeError> {
        let url = self.url(path);
        debug!(%url, "POST");

        let response = self
            .decorate(self.client.post(&url))
            .json(body)
            .send()
            .await?;
        Self::read(response).await
    }
}
