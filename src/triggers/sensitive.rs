//! Redacts sensitive text from the reply built so far.

use super::{Outcome, Trigger, TriggerResult, parse_options};
use crate::error::BindError;
use crate::protocol::{Request, Response};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

pub const DRIVER: &str = "gogap-sensitive-filter";

const MASK: &str = "******";

#[derive(Debug, Default, Deserialize)]
struct SensitiveOptions {
    #[serde(default)]
    expressions: Vec<String>,
}

/// Masks every match of the configured expressions in the response text.
///
/// Place it after the triggers that produce text.
pub struct Sensitive {
    expressions: Vec<Regex>,
}

impl Sensitive {
    pub fn new<S: AsRef<str>>(expressions: &[S]) -> Result<Self, BindError> {
        let expressions = expressions
            .iter()
            .map(|e| {
                Regex::new(e.as_ref()).map_err(|source| BindError::InvalidExpression {
                    expression: e.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { expressions })
    }

    pub fn build(_word: &str, options: &toml::Table) -> Result<Arc<dyn Trigger>, BindError> {
        let opts: SensitiveOptions = parse_options(DRIVER, options)?;
        Ok(Arc::new(Self::new(&opts.expressions)?))
    }
}

#[async_trait]
impl Trigger for Sensitive {
    async fn handle(&self, _req: &Request, resp: &mut Response) -> TriggerResult {
        for expr in &self.expressions {
            if let std::borrow::Cow::Owned(masked) = expr.replace_all(&resp.text, MASK) {
                resp.text = masked;
            }
        }
        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_masks_every_match() {
        let filter = Sensitive::new(&[r"password=\S+", r"\d{4}-\d{4}"]).unwrap();
        let mut resp = Response::text("db password=hunter2 card 1234-5678 ok");
        filter
            .handle(&Request::new("!x", "!x", "zeal"), &mut resp)
            .await
            .unwrap();
        assert_eq!(resp.text, "db ****** card ****** ok");
    }

    #[test]
    fn test_bad_expression_is_bind_error() {
        assert!(matches!(
            Sensitive::new(&["(unclosed"]),
            Err(BindError::InvalidExpression { .. })
        ));
    }
}
