//! The rate quote operation: build, send, interpret.

use anyhow::Result;
use log::{debug, warn};
use reqwest::Client;

use crate::credentials::Credentials;
use crate::http::{HttpClient, HttpTransport, Transport};
use crate::request::{RateOptions, RateRequestDocument};
use crate::response::{RateResult, interpret};
use crate::shipment::ShipmentDescription;

/// Quotes shipping rates against one endpoint with one set of credentials.
///
/// Holds no per-call state, so a single service can quote many shipments
/// concurrently.
pub struct RateService<T: Transport> {
    transport: T,
    credentials: Credentials,
    endpoint: String,
}

impl RateService<HttpTransport> {
    /// Service over HTTP, posting to the endpoint of the credentials' mode.
    pub fn from_credentials(credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("shiprate/", env!("SHIPRATE_VERSION")))
            .build()?;
        let transport = HttpTransport::new(HttpClient::new(client));
        Ok(Self::new(transport, credentials))
    }
}

impl<T: Transport> RateService<T> {
    pub fn new(transport: T, credentials: Credentials) -> Self {
        let endpoint = credentials.mode.endpoint().to_string();
        Self {
            transport,
            credentials,
            endpoint,
        }
    }

    /// Posts to `endpoint` instead of the mode's default.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Builds the request document without sending it.
    pub fn build_request(
        &self,
        shipment: &ShipmentDescription,
        options: &RateOptions,
    ) -> RateRequestDocument {
        RateRequestDocument::build(&self.credentials, shipment, options)
    }

    /// Requests a rate quote for `shipment`.
    ///
    /// Transport failures are reported as [`RateResult::Failure`] with the
    /// error chain as the message.
    #[tracing::instrument(skip(self, shipment, options))]
    pub async fn get_rate_quote(
        &self,
        shipment: &ShipmentDescription,
        options: &RateOptions,
    ) -> RateResult {
        let document = self.build_request(shipment, options);
        debug!("Requesting {} rate from {}...", shipment.service_type, self.endpoint);

        match self.transport.post(&self.endpoint, document.as_str()).await {
            Ok(reply) => interpret(&reply),
            Err(e) => {
                warn!("Rate request to {} failed: {:#}", self.endpoint, e);
                RateResult::Failure(format!("{:#}", e))
            }
        }
    }
}
