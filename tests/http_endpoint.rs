//! Integration tests for the webhook HTTP surface.

mod common;

use async_trait::async_trait;
use common::{TestClient, TestServer, dispatcher_from, request};
use slashgate::{Outcome, Request, Response, Trigger, TriggerResult};
use std::sync::Arc;

const CONFIG: &str = r#"
[http]
path = "/hook"

[triggers.hello]
word = "!hello"
drivers = ["gogap-greeter"]

[triggers.hello.gogap-greeter]
name = "robot A"
image = "https://example.com/robot.png"

[triggers.plain]
word = "!plain"
drivers = ["gogap-greeter"]

[triggers.plain.gogap-greeter]
name = "robot B"
"#;

/// Acknowledges without a reply.
struct Silent;

#[async_trait]
impl Trigger for Silent {
    async fn handle(&self, _req: &Request, _resp: &mut Response) -> TriggerResult {
        Ok(Outcome::NoContent)
    }
}

async fn spawn() -> TestServer {
    let (config, mut dispatcher) = dispatcher_from(CONFIG);
    dispatcher
        .bind_direct("!ack", vec![Arc::new(Silent) as Arc<dyn Trigger>])
        .unwrap();
    TestServer::spawn(dispatcher, &config).await.unwrap()
}

#[tokio::test]
async fn test_reply_is_json() {
    let server = spawn().await;
    let client = TestClient::new(server.webhook_url());

    let reply = client.post(&request("!hello", "!hello", "zeal")).await.unwrap();
    assert_eq!(reply.status, 200);
    let resp = reply.response();
    assert_eq!(resp.text, "Hello zeal I am robot A");
    assert_eq!(resp.attachments[0].images[0].url, "https://example.com/robot.png");

    let reply = client.post(&request("!plain", "!plain", "zeal")).await.unwrap();
    let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(body, serde_json::json!({"text": "Hello zeal I am robot B", "markdown": false}));
}

#[tokio::test]
async fn test_no_content_is_204() {
    let server = spawn().await;
    let client = TestClient::new(server.webhook_url());

    let reply = client.post(&request("!ack", "!ack", "zeal")).await.unwrap();
    assert_eq!(reply.status, 204);
    assert!(reply.body.is_empty());
}

#[tokio::test]
async fn test_errors_render_as_replies() {
    let server = spawn().await;
    let client = TestClient::new(server.webhook_url());

    let reply = client.post(&request("!nope", "!nope", "zeal")).await.unwrap();
    assert_eq!(reply.status, 200);
    assert_eq!(reply.response().text, "trigger of !nope not exist!");

    let reply = client.post_raw("{not json").await.unwrap();
    assert_eq!(reply.status, 200);
    assert!(reply.response().text.starts_with("malformed payload"));
}

#[tokio::test]
async fn test_only_post_is_allowed() {
    let server = spawn().await;
    let client = TestClient::new(server.webhook_url());

    let reply = client.get().await.unwrap();
    assert_eq!(reply.status, 405);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = spawn().await;
    slashgate::metrics::init();

    let client = TestClient::new(server.webhook_url());
    client.post(&request("!hello", "!hello", "zeal")).await.unwrap();

    let body = reqwest::get(server.url("/metrics"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("slashgate_requests_total"));
}
