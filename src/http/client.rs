//! HTTP client with built-in retry logic and error handling.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use super::retry::{MAX_RETRIES, NonRetryableError, RETRY_DELAY_MS, check_status};

/// HTTP client with built-in retry logic for rate service calls.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    retry_delay: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// POSTs an XML document and returns the response body.
    ///
    /// The service reports faults with an error status and an XML body, so
    /// an unsuccessful response that carries XML is returned as the body.
    /// Automatically retries on transient errors.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_xml(&self, url: &str, body: &str) -> Result<String> {
        debug!("POST {} bytes of XML to {}...", body.len(), url);

        self.with_retry("POST XML", || async {
            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/xml")
                .body(body.to_string())
                .send()
                .await
                .context("Failed to send request")?;

            let status = response.status();
            let text = response
                .text()
                .await
                .context("Failed to read response body")?;

            if status.is_success() {
                return Ok(text);
            }

            if looks_like_xml(&text) {
                warn!("Rate service answered HTTP {} with an XML body", status);
                return Ok(text);
            }

            Err(check_status(status))
        })
        .await
    }

    /// Executes an async operation with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable_error(&e) {
                        debug!("{}: non-retryable error: {}", operation_name, e);
                        return Err(e);
                    }

                    if attempt < MAX_RETRIES {
                        warn!(
                            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                            operation_name,
                            attempt,
                            MAX_RETRIES,
                            e,
                            self.retry_delay.as_millis()
                        );
                        tokio::time::sleep(self.retry_delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("{}: failed after {} attempts", operation_name, MAX_RETRIES)
        }))
    }
}

fn looks_like_xml(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

/// Checks if an anyhow::Error is retryable based on its content.
fn is_retryable_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<NonRetryableError>().is_none()
}
