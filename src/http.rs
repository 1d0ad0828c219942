//! HTTP surface: the outgoing-webhook endpoint and the Prometheus endpoint.
//!
//! The webhook path only accepts POST; other methods get 405 from the
//! router. Payloads that fail to decode are rendered through the
//! dispatcher's error handler like any other per-request error, so the
//! platform always gets a displayable reply.

use crate::config::Config;
use crate::dispatcher::{Dispatched, Dispatcher};
use crate::error::DispatchError;
use crate::protocol::Request;
use crate::telemetry::spans;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Instrument, debug, info};

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Handler for the outgoing webhook path.
async fn outgoing_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    uri: Uri,
    body: Bytes,
) -> Response {
    let span = spans::delivery("POST", uri.path());
    let req: Request = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            let _enter = span.enter();
            debug!(error = %e, "Malformed outgoing payload");
            let cause = DispatchError::MalformedPayload(e.to_string());
            crate::metrics::record_error(cause.error_code());
            return Json(dispatcher.render(&cause)).into_response();
        }
    };

    match dispatcher.handle(req).instrument(span).await {
        Dispatched::NoContent => StatusCode::NO_CONTENT.into_response(),
        Dispatched::Message(resp) => Json(resp).into_response(),
    }
}

/// Build the router for `config`.
pub fn router(dispatcher: Arc<Dispatcher>, config: &Config) -> Router {
    let mut app = Router::new().route(&config.http.path, post(outgoing_handler));
    if config.metrics.enabled {
        app = app.route(&config.metrics.path, get(metrics_handler));
    }
    app.with_state(dispatcher)
}

/// Serve `app` on `listener` until the process stops.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(address = %addr, "Webhook HTTP server listening");
    axum::serve(listener, app).await
}
