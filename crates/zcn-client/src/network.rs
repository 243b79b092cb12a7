use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use zcn_common::{Method, Request, Response, Transport, ZcnError};

/// HTTP implementation of the transport boundary.
#[derive(Debug, Clone)]
pub struct ClientNetwork {
    client: reqwest::Client,
}

impl ClientNetwork {
    pub fn new(timeout: Duration) -> Result<Self, ZcnError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ZcnError::NetworkError(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an already configured client (shared connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ClientNetwork {
    async fn send(&self, request: Request) -> Result<Response, ZcnError> {
        debug!("{} {}", request.method, request.url);
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self
                .client
                .post(&request.url)
                .header(reqwest::header::CONTENT_TYPE, "application/json"),
        };
        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder,
        };
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ZcnError::Timeout(request.url.clone())
            } else {
                ZcnError::NetworkError(e.to_string())
            }
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ZcnError::NetworkError(e.to_string()))?;
        Ok(Response { status, body })
    }
}
