//! slashgate - slash-command webhook gateway.
//!
//! A chat platform posts an "outgoing webhook" whenever a message starts
//! with a registered trigger word. slashgate routes that request through a
//! per-word command tree to a chain of triggers (auth, filters, step-up
//! confirmation, command execution, ...) and renders the reply.
//!
//! ```text
//!  POST /outgoing ──> Dispatcher ──> CommandTree[word] ──> [Trigger, Trigger, ...]
//!                        │                                        │
//!                        └── error handler <── DispatchError ─────┘
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod incoming;
pub mod metrics;
pub mod protocol;
pub mod registry;
pub mod telemetry;
pub mod tree;
pub mod triggers;

pub use config::Config;
pub use dispatcher::{Dispatched, Dispatcher};
pub use error::{BindError, DispatchError, IncomingError, TriggerError};
pub use protocol::{Attachment, Image, Request, Response};
pub use registry::DriverRegistry;
pub use triggers::{Outcome, Trigger, TriggerResult};
