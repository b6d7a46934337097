//! Rate reply interpretation.
//!
//! A reply is reduced to exactly one [`RateResult`]. Structural surprises
//! in the reply never escape as errors; the failure branch degrades to the
//! best message text it could recover.

use anyhow::Result;
use log::{debug, warn};
use serde_json::Value;
use std::fmt;

use crate::xml::{one_or_many, parse_document};

/// Severities under which the service's rates are usable.
pub const SUCCESS_SEVERITIES: [&str; 3] = ["SUCCESS", "WARNING", "NOTE"];

/// Returned when no message text could be recovered from a failed reply.
pub const UNKNOWN_ERROR: &str = "Unknown error";

const SOAP_WRAPPERS: [&str; 2] = ["Envelope", "Body"];

/// Raw structured reply from the rate service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReply {
    root: Value,
}

impl ServiceReply {
    /// Wraps an already parsed reply. A SOAP `Envelope/Body` wrapper is
    /// unwrapped so that `RateReply` or `Fault` sit at the top level.
    pub fn from_value(root: Value) -> Self {
        let body = SOAP_WRAPPERS
            .iter()
            .try_fold(&root, |v, key| v.get(*key))
            .filter(|body| body.is_object())
            .cloned();

        Self {
            root: body.unwrap_or(root),
        }
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        Ok(Self::from_value(parse_document(xml)?))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn rate_reply(&self) -> Option<&Value> {
        self.root.get("RateReply")
    }

    pub fn highest_severity(&self) -> Option<&str> {
        self.rate_reply()
            .and_then(|r| r.get("HighestSeverity"))
            .and_then(Value::as_str)
    }

    /// The reply carries a rate reply whose severity is usable.
    pub fn is_success(&self) -> bool {
        self.rate_reply().is_some()
            && self
                .highest_severity()
                .is_some_and(|s| SUCCESS_SEVERITIES.contains(&s.trim()))
    }
}

/// Normalized outcome of a rate quote.
#[derive(Debug, Clone, PartialEq)]
pub enum RateResult {
    Success(RateDetails),
    Failure(String),
}

impl RateResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RateResult::Success(_))
    }

    pub fn details(&self) -> Option<&RateDetails> {
        match self {
            RateResult::Success(details) => Some(details),
            RateResult::Failure(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RateResult::Success(_) => None,
            RateResult::Failure(message) => Some(message.as_str()),
        }
    }

    pub fn into_result(self) -> Result<RateDetails> {
        match self {
            RateResult::Success(details) => Ok(details),
            RateResult::Failure(message) => Err(anyhow::anyhow!(message)),
        }
    }
}

/// Monetary amount as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money {
    pub currency: String,
    pub amount: String,
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Shipment-level charge breakdown from the first rated shipment.
#[derive(Debug, Clone, PartialEq)]
pub struct RateDetails {
    raw: Value,
}

impl RateDetails {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// The `ShipmentRateDetail` exactly as it appeared in the reply.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn rate_type(&self) -> Option<&str> {
        self.text("RateType")
    }

    pub fn rate_zone(&self) -> Option<&str> {
        self.text("RateZone")
    }

    /// e.g. `"2.0 LB"`
    pub fn total_billing_weight(&self) -> Option<String> {
        let weight = self.raw.get("TotalBillingWeight")?;
        let value = weight.get("Value").and_then(Value::as_str)?;
        let units = weight.get("Units").and_then(Value::as_str)?;
        Some(format!("{} {}", value, units))
    }

    pub fn total_base_charge(&self) -> Option<Money> {
        self.money("TotalBaseCharge")
    }

    pub fn total_freight_discounts(&self) -> Option<Money> {
        self.money("TotalFreightDiscounts")
    }

    pub fn total_net_freight(&self) -> Option<Money> {
        self.money("TotalNetFreight")
    }

    pub fn total_surcharges(&self) -> Option<Money> {
        self.money("TotalSurcharges")
    }

    pub fn total_taxes(&self) -> Option<Money> {
        self.money("TotalTaxes")
    }

    pub fn total_net_charge(&self) -> Option<Money> {
        self.money("TotalNetCharge")
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    fn money(&self, key: &str) -> Option<Money> {
        let money = self.raw.get(key)?;
        Some(Money {
            currency: money.get("Currency")?.as_str()?.to_string(),
            amount: scalar_text(money.get("Amount")?)?,
        })
    }
}

/// Classifies `reply` and extracts its rate details or error message.
#[tracing::instrument(skip(reply))]
pub fn interpret(reply: &ServiceReply) -> RateResult {
    if !reply.is_success() {
        let message = failure_message(reply);
        debug!("Rate request failed: {}", message);
        return RateResult::Failure(message);
    }

    match first_shipment_rate_detail(reply) {
        Some(detail) => RateResult::Success(RateDetails::new(detail.clone())),
        None => {
            warn!(
                "Rate reply with severity {:?} has no rated shipment details",
                reply.highest_severity()
            );
            RateResult::Failure("Rate reply did not include rated shipment details".to_string())
        }
    }
}

/// `RateReply/RateReplyDetails[0]/RatedShipmentDetails[0]/ShipmentRateDetail`
fn first_shipment_rate_detail(reply: &ServiceReply) -> Option<&Value> {
    let details = first(reply.rate_reply()?.get("RateReplyDetails")?)?;
    let rated = first(details.get("RatedShipmentDetails")?)?;
    rated.get("ShipmentRateDetail")
}

fn first(value: &Value) -> Option<&Value> {
    one_or_many(value).into_iter().next()
}

/// Best available error text for a failed reply. Never empty.
pub fn failure_message(reply: &ServiceReply) -> String {
    let fragment = match reply.rate_reply() {
        Some(rate_reply) => notification_message(rate_reply),
        None => fault_message(reply.root()),
    };

    fragment
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// First notification's message. Falls back to the severity when the
/// notification carries no message.
fn notification_message(rate_reply: &Value) -> Option<String> {
    let severity = rate_reply
        .get("HighestSeverity")
        .and_then(non_empty_text)
        .map(|s| format!("Rate request failed with severity {}", s));

    let message = rate_reply
        .get("Notifications")
        .and_then(first)
        .and_then(|n| n.get("Message"))
        .and_then(non_empty_text);

    message.or(severity)
}

/// `"<reason>\n<validation failure message>"` from a fault envelope.
///
/// Whatever part of the pair was found is returned when the other is
/// missing. A bare SOAP fault with only `faultstring` yields that string.
fn fault_message(root: &Value) -> Option<String> {
    let envelope = root.get("Fault")?;
    let fault = envelope.get("detail").and_then(|d| d.get("fault"));

    let reason = fault.and_then(|f| f.get("reason")).and_then(non_empty_text);
    let detail = fault
        .and_then(|f| f.get("details"))
        .and_then(|d| d.get("ValidationFailureDetail"))
        .and_then(first)
        .and_then(|v| v.get("message"))
        .and_then(non_empty_text);

    match (reason, detail) {
        (Some(reason), Some(detail)) => Some(format!("{}\n{}", reason, detail)),
        (Some(partial), None) | (None, Some(partial)) => Some(partial),
        (None, None) => envelope.get("faultstring").and_then(non_empty_text),
    }
}

fn non_empty_text(value: &Value) -> Option<String> {
    scalar_text(value).filter(|s| !s.trim().is_empty())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
