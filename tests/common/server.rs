//! Test server management.
//!
//! Serves a dispatcher's router on an ephemeral local port.

use slashgate::config::Config;
use slashgate::{Dispatcher, http};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A running in-process webhook server.
pub struct TestServer {
    addr: SocketAddr,
    path: String,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Serve `dispatcher` with the routes from `config`.
    pub async fn spawn(dispatcher: Dispatcher, config: &Config) -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = http::router(Arc::new(dispatcher), config);
        let handle = tokio::spawn(async move {
            let _ = http::serve(listener, app).await;
        });
        Ok(Self {
            addr,
            path: config.http.path.clone(),
            handle,
        })
    }

    /// URL of the outgoing webhook endpoint.
    pub fn webhook_url(&self) -> String {
        format!("http://{}{}", self.addr, self.path)
    }

    /// URL of an arbitrary path on the server.
    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
