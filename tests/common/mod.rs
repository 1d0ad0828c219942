//! Integration test common infrastructure.
//!
//! Provides utilities for spawning in-process webhook servers, posting
//! requests to them, and building requests and dispatchers.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;

use slashgate::config::Config;
use slashgate::{Dispatcher, DriverRegistry, Request};

/// A request as the platform would send it.
#[allow(dead_code)]
pub fn request(trigger_word: &str, text: &str, user: &str) -> Request {
    let mut req = Request::new(trigger_word, text, user);
    req.channel_name = "general".to_string();
    req.subdomain = "gogap".to_string();
    req.token = "token-a".to_string();
    req
}

/// Parse `toml` and bind it with the built-in drivers.
#[allow(dead_code)]
pub fn dispatcher_from(toml: &str) -> (Config, Dispatcher) {
    let config: Config = toml::from_str(toml).expect("test config parses");
    slashgate::config::validate(&config).expect("test config validates");
    let registry = DriverRegistry::with_builtins().unwrap();
    let dispatcher = Dispatcher::from_bindings_with(
        config.dispatcher.clone(),
        config.triggers.values(),
        &registry,
    )
    .expect("test config binds");
    (config, dispatcher)
}
