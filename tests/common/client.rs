//! Test client for posting outgoing webhook deliveries.

use slashgate::{Request, Response};

/// Posts requests to a [`TestServer`](super::TestServer).
pub struct TestClient {
    http: reqwest::Client,
    url: String,
}

/// A decoded reply.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    /// Decode the body as a rendered response.
    #[allow(dead_code)]
    pub fn response(&self) -> Response {
        serde_json::from_str(&self.body).expect("reply body is a response")
    }
}

impl TestClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Post `req` as JSON.
    pub async fn post(&self, req: &Request) -> anyhow::Result<Reply> {
        let resp = self.http.post(&self.url).json(req).send().await?;
        Self::reply(resp).await
    }

    /// Post a raw body.
    #[allow(dead_code)]
    pub async fn post_raw(&self, body: &'static str) -> anyhow::Result<Reply> {
        let resp = self
            .http
            .post(&self.url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;
        Self::reply(resp).await
    }

    /// Send a GET to the webhook path.
    #[allow(dead_code)]
    pub async fn get(&self) -> anyhow::Result<Reply> {
        let resp = self.http.get(&self.url).send().await?;
        Self::reply(resp).await
    }

    async fn reply(resp: reqwest::Response) -> anyhow::Result<Reply> {
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(Reply { status, body })
    }
}
