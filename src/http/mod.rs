//! HTTP transport for the rate service with retry logic and error handling.

mod client;
mod retry;
mod transport;

pub use client::HttpClient;
pub use retry::{
    MAX_RETRIES, NonRetryableError, RETRY_DELAY_MS, check_status, classify_status,
};
#[cfg(test)]
pub use transport::MockTransport;
pub use transport::{HttpTransport, Transport};
