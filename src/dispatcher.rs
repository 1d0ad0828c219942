//! Request dispatcher.
//!
//! Owns one [`CommandTree`] per trigger word. A request is validated, routed
//! to the chain bound at its command path, and the chain's result is
//! rendered into a [`Dispatched`] reply. The forest is built once and only
//! read afterwards, so `handle` can run concurrently without locking.

use crate::config::{BindingConfig, DispatcherSettings};
use crate::error::{BindError, DispatchError};
use crate::protocol::{Request, Response};
use crate::registry::{self, DriverRegistry};
use crate::telemetry::{DispatchTimer, spans};
use crate::triggers::{Outcome, Trigger};
use crate::tree::{CommandTree, NodeId};
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{Instrument, debug, info};

/// A bound trigger chain.
pub type Chain = Vec<Arc<dyn Trigger>>;

/// Renders a per-request error into a reply.
pub type ErrorHandler = Arc<dyn Fn(&DispatchError) -> Response + Send + Sync>;

/// Final result of one request, for the boundary layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Render this reply.
    Message(Response),
    /// Acknowledge with an empty body.
    NoContent,
}

/// Default error rendering: the error's message as plain reply text.
pub fn render_error(cause: &DispatchError) -> Response {
    Response::text(cause.to_string())
}

/// Routes requests to trigger chains.
pub struct Dispatcher {
    trees: HashMap<String, CommandTree<Arc<dyn Trigger>>>,
    settings: DispatcherSettings,
    error_handler: ErrorHandler,
}

impl Dispatcher {
    /// Create a dispatcher with no bindings.
    pub fn new(settings: DispatcherSettings) -> Self {
        Self {
            trees: HashMap::new(),
            settings,
            error_handler: Arc::new(render_error),
        }
    }

    /// Create a dispatcher and bind every entry using the process-wide
    /// driver registry.
    pub fn from_bindings<'a>(
        settings: DispatcherSettings,
        bindings: impl IntoIterator<Item = &'a BindingConfig>,
    ) -> Result<Self, BindError> {
        let registry = registry::global()?.read();
        Self::from_bindings_with(settings, bindings, &registry)
    }

    /// Create a dispatcher and bind every entry using `registry`.
    pub fn from_bindings_with<'a>(
        settings: DispatcherSettings,
        bindings: impl IntoIterator<Item = &'a BindingConfig>,
        registry: &DriverRegistry,
    ) -> Result<Self, BindError> {
        let mut dispatcher = Self::new(settings);
        for binding in bindings {
            dispatcher.bind(binding, registry)?;
        }
        Ok(dispatcher)
    }

    /// Bind one configuration entry.
    pub fn bind(
        &mut self,
        binding: &BindingConfig,
        registry: &DriverRegistry,
    ) -> Result<(), BindError> {
        let word = binding.word.trim();
        if word.is_empty() {
            return Err(BindError::EmptyWord);
        }
        if binding.drivers.is_empty() {
            return Err(BindError::NoDrivers(word.to_string()));
        }

        let chain = registry.build_chain(word, &binding.drivers, &binding.options)?;
        self.bind_chain(word, &binding.commands, chain)?;

        info!(
            word = %word,
            commands = %binding.commands.join(" "),
            drivers = %binding.drivers.join(","),
            "Trigger bound"
        );
        Ok(())
    }

    /// Bind a pre-built chain at the root of `word`.
    pub fn bind_direct(&mut self, word: &str, chain: Chain) -> Result<(), BindError> {
        self.bind_chain(word, &[] as &[String], chain)
    }

    /// Bind a pre-built chain at `word` followed by `commands`.
    pub fn bind_chain<S: AsRef<str>>(
        &mut self,
        word: &str,
        commands: &[S],
        chain: Chain,
    ) -> Result<(), BindError> {
        let word = word.trim();
        if word.is_empty() {
            return Err(BindError::EmptyWord);
        }
        if chain.is_empty() {
            return Err(BindError::NoDrivers(word.to_string()));
        }
        self.trees
            .entry(word.to_string())
            .or_default()
            .bind(word, commands, chain)?;
        Ok(())
    }

    /// Replace the error handler. `None` restores the default.
    pub fn set_error_handler(&mut self, handler: Option<ErrorHandler>) {
        self.error_handler = handler.unwrap_or_else(|| Arc::new(render_error));
    }

    /// Render an error through the configured handler.
    pub fn render(&self, cause: &DispatchError) -> Response {
        (self.error_handler)(cause)
    }

    /// Bound trigger words, sorted.
    pub fn words(&self) -> Vec<String> {
        let mut words: Vec<String> = self.trees.keys().cloned().collect();
        words.sort();
        words
    }

    /// Handle one request end to end.
    pub async fn handle(&self, req: Request) -> Dispatched {
        let word = req.trigger_word.trim().to_string();
        let span = spans::dispatch(&word, &req.user_name, &req.channel_name);

        let mut resp = Response::default();
        let result = self.route(req, &mut resp).instrument(span).await;

        match result {
            Ok(Outcome::NoContent) => Dispatched::NoContent,
            Ok(_) => Dispatched::Message(resp),
            Err(e) => {
                crate::metrics::record_error(e.error_code());
                debug!(word = %word, error = %e, "Dispatch error");
                Dispatched::Message(self.render(&e))
            }
        }
    }

    /// Route a request and run its chain against `resp`.
    ///
    /// Returns the outcome that ended the chain: `Continue` when every
    /// trigger ran, `Break` or `NoContent` when one stopped it early.
    pub async fn route(&self, req: Request, resp: &mut Response) -> Result<Outcome, DispatchError> {
        self.validate(&req)?;

        let word = req.trigger_word.trim();
        let tree = self
            .trees
            .get(word)
            .ok_or_else(|| DispatchError::UnknownTrigger(word.to_string()))?;
        // Only bound words become metric labels.
        let _timer = DispatchTimer::new(word);

        let node = {
            let args = req.args();
            let node = tree.match_path(NodeId::ROOT, &args[..]);
            if node == NodeId::ROOT && tree.values(node).is_empty() {
                return Err(DispatchError::UnknownSubCommand(args.join(" ")));
            }
            if tree.values(node).is_empty() {
                return Err(DispatchError::IncompleteSubCommand(
                    tree.commands(node).join(" "),
                ));
            }
            node
        };

        let mut req = req;
        req.commands = tree.commands(node);
        crate::metrics::record_request(req.trigger_word.trim());

        for trigger in tree.values(node) {
            match trigger.handle(&req, resp).await? {
                Outcome::Continue => {}
                Outcome::Replay(original) => req = original,
                stop @ (Outcome::Break | Outcome::NoContent) => return Ok(stop),
            }
        }

        Ok(Outcome::Continue)
    }

    fn validate(&self, req: &Request) -> Result<(), DispatchError> {
        if req.trigger_word.trim().is_empty() {
            return Err(DispatchError::EmptyTriggerWord);
        }

        if self.settings.validate_token && !self.settings.tokens.is_empty() {
            let token = req.token.as_bytes();
            let known = self
                .settings
                .tokens
                .iter()
                .any(|t| bool::from(t.as_bytes().ct_eq(token)));
            if !known {
                return Err(DispatchError::BadAuthToken);
            }
        }

        Ok(())
    }
}
