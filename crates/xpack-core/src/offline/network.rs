//! Network access for the worker.

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use super::{CacheError, Request, Response};

/// Performs a request against the network. HTTP error statuses are
/// responses, not errors; only a request that produced no response fails.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, CacheError>;
}

/// Network backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new() -> Result<Self, CacheError> {
        let client = Client::builder()
            .user_agent(concat!("xpack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, CacheError> {
        let mut builder = self.client.request(request.method.into(), request.url.clone());
        if let Some(ref accept) = request.accept {
            builder = builder.header(header::ACCEPT, accept);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.bytes().await?.to_vec();
        debug!(url = %request.url, status, bytes = body.len(), "Fetched from network");

        Ok(Response {
            url: request.url.to_string(),
            status,
            content_type,
            body,
        })
    }
}
