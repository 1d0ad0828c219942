//! Static greeting reply.

use super::{Outcome, Trigger, TriggerResult, parse_options};
use crate::error::BindError;
use crate::protocol::{Attachment, Image, Request, Response};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

pub const DRIVER: &str = "gogap-greeter";

#[derive(Debug, Default, Deserialize)]
struct GreeterOptions {
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: String,
}

/// Replies `"<Greeting> <user> I am <name>"`, with an optional image.
///
/// `!morning` greets with "Morning"; every other word with "Hello".
pub struct Greeter {
    name: String,
    image: String,
}

impl Greeter {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
        }
    }

    pub fn build(_word: &str, options: &toml::Table) -> Result<Arc<dyn Trigger>, BindError> {
        let opts: GreeterOptions = parse_options(DRIVER, options)?;
        Ok(Arc::new(Self::new(opts.name, opts.image)))
    }
}

#[async_trait]
impl Trigger for Greeter {
    async fn handle(&self, req: &Request, resp: &mut Response) -> TriggerResult {
        let greeting = match req.trigger_word.trim() {
            "!morning" => "Morning",
            _ => "Hello",
        };
        resp.text = format!("{} {} I am {}", greeting, req.user_name, self.name);
        if !self.image.is_empty() {
            resp.attachments = vec![Attachment {
                images: vec![Image {
                    url: self.image.clone(),
                }],
                ..Attachment::default()
            }];
        }
        Ok(Outcome::Continue)
    }
}
