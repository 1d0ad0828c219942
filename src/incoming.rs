//! Client for posting messages to a remote incoming webhook.

use crate::error::IncomingError;
use crate::protocol::Attachment;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default request timeout for incoming webhook posts.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Message posted to an incoming webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Message {
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notification: String,
    pub markdown: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub channel: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Reply from the incoming webhook endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IncomingResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

impl IncomingResponse {
    /// The remote failure, if `code` is non-zero.
    pub fn err(&self) -> Option<IncomingError> {
        (self.code != 0).then(|| IncomingError::Remote {
            code: self.code,
            error: self.error.clone(),
        })
    }
}

/// Posts JSON messages to incoming webhook URLs.
#[derive(Debug, Clone)]
pub struct IncomingClient {
    http_client: reqwest::Client,
}

impl IncomingClient {
    /// Create a client whose requests time out after `timeout`.
    ///
    /// Fails when the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, IncomingError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("slashgate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http_client })
    }

    /// Post `msg` to `url` and decode the reply.
    ///
    /// A reply with a non-zero `code` is returned as [`IncomingError::Remote`].
    pub async fn send(&self, url: &str, msg: &Message) -> Result<IncomingResponse, IncomingError> {
        if url.is_empty() {
            return Err(IncomingError::EmptyUrl);
        }

        let resp: IncomingResponse = self
            .http_client
            .post(url)
            .json(msg)
            .send()
            .await?
            .json()
            .await?;

        debug!(url = %url, code = resp.code, "Incoming webhook replied");
        match resp.err() {
            Some(e) => Err(e),
            None => Ok(resp),
        }
    }
}
