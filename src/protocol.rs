//! Webhook wire types.
//!
//! [`Request`] is the inbound "outgoing webhook" payload posted by the chat
//! platform when a message starts with a trigger word. [`Response`] is the
//! reply rendered back to the channel, built up by the trigger chain.

use serde::{Deserialize, Serialize};

/// Inbound webhook payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Token the platform signs every delivery with.
    #[serde(default)]
    pub token: String,
    /// Message timestamp (epoch seconds).
    #[serde(default, rename = "ts")]
    pub timestamp: i64,
    /// Raw message text, trigger word included.
    #[serde(default)]
    pub text: String,
    /// The trigger word that matched on the platform side.
    #[serde(default)]
    pub trigger_word: String,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub user_name: String,
    /// Command path resolved by the dispatcher; never on the wire.
    #[serde(skip)]
    pub commands: Vec<String>,
}

impl Request {
    /// Create a request with the fields routing cares about.
    pub fn new(
        trigger_word: impl Into<String>,
        text: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            trigger_word: trigger_word.into(),
            text: text.into(),
            user_name: user_name.into(),
            ..Self::default()
        }
    }

    /// Free-text arguments after the trigger word and the resolved command path.
    ///
    /// Each prefix is stripped at most once, case-sensitively, and the rest is
    /// split on whitespace. An empty vector means no arguments.
    pub fn args(&self) -> Vec<&str> {
        let mut rest = strip(&self.text, &self.trigger_word);
        for command in &self.commands {
            rest = strip(rest, command);
        }
        rest.split_whitespace().collect()
    }
}

fn strip<'a>(text: &'a str, prefix: &str) -> &'a str {
    text.strip_prefix(prefix).unwrap_or(text).trim()
}

/// Image embedded in an attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

/// Rich attachment rendered under the reply text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Reply rendered back to the channel.
///
/// Triggers in a chain share one `Response` and may overwrite or extend it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    /// Render `text` as markdown.
    #[serde(default)]
    pub markdown: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Response {
    /// A plain-text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}
