use anyhow::{Context, Result};
use async_trait::async_trait;

use super::HttpClient;
use crate::response::ServiceReply;

/// Delivers a request document to the rate service and returns its reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, body: &str) -> Result<ServiceReply>;
}

/// [`Transport`] over HTTP with XML replies.
#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, body))]
    async fn post(&self, url: &str, body: &str) -> Result<ServiceReply> {
        let xml = self.http.post_xml(url, body).await?;
        ServiceReply::from_xml(&xml).context("Failed to parse rate service reply")
    }
}
