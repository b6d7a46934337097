//! Rate request construction.
//!
//! Turns a [`ShipmentDescription`] and [`RateOptions`] into the XML document
//! expected by the rate service (schema v13). Element order inside the
//! document is fixed by the service schema.

use chrono::{DateTime, Days, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::credentials::Credentials;
use crate::shipment::ShipmentDescription;
use crate::xml::Element;

pub const RATE_NAMESPACE: &str = "http://fedex.com/ws/rate/v13";
pub const SERVICE_ID: &str = "crs";
pub const SERVICE_VERSION: u32 = 13;

pub const DEFAULT_DROP_OFF_TYPE: &str = "REGULAR_PICKUP";
pub const DEFAULT_PACKAGING_TYPE: &str = "YOUR_PACKAGING";

/// Options for a single rate quote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateOptions {
    /// Ask for Saturday-delivery list rates instead of account rates.
    pub saturday_rates: bool,
    /// Days to move the ship timestamp forward.
    pub future_day: u32,
    /// Free-form `CustomsClearanceDetail` block, written only when present.
    pub customs_clearance: Option<Value>,
    pub drop_off_type: Option<String>,
    pub packaging_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateRequestType {
    Account,
    List,
}

impl RateRequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            RateRequestType::Account => "ACCOUNT",
            RateRequestType::List => "LIST",
        }
    }
}

impl fmt::Display for RateRequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RateOptions {
    pub fn effective_drop_off_type(&self) -> &str {
        self.drop_off_type
            .as_deref()
            .unwrap_or(DEFAULT_DROP_OFF_TYPE)
    }

    pub fn effective_packaging_type(&self) -> &str {
        self.packaging_type
            .as_deref()
            .unwrap_or(DEFAULT_PACKAGING_TYPE)
    }

    pub fn rate_request_type(&self) -> RateRequestType {
        if self.saturday_rates {
            RateRequestType::List
        } else {
            RateRequestType::Account
        }
    }
}

/// A rendered rate request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequestDocument {
    root: Element,
    xml: String,
}

impl RateRequestDocument {
    /// Builds the request stamped with the current time.
    pub fn build(
        credentials: &Credentials,
        shipment: &ShipmentDescription,
        options: &RateOptions,
    ) -> Self {
        Self::build_at(credentials, shipment, options, Utc::now())
    }

    /// Builds the request as if the clock read `now`.
    #[tracing::instrument(skip(credentials, shipment, options))]
    pub fn build_at(
        credentials: &Credentials,
        shipment: &ShipmentDescription,
        options: &RateOptions,
        now: DateTime<Utc>,
    ) -> Self {
        let return_transit = options
            .saturday_rates
            .then(|| Element::text("ReturnTransitAndCommit", true));

        let root = Element::new("RateRequest")
            .attr("xmlns", RATE_NAMESPACE)
            .child(web_authentication_detail(credentials))
            .child(client_detail(credentials))
            .child(version())
            .child_opt(return_transit)
            .child(requested_shipment(credentials, shipment, options, now));

        let xml = root.to_xml();
        debug!(
            "Built rate request: service {}, {} package(s), rate type {}",
            shipment.service_type,
            shipment.packages.len(),
            options.rate_request_type()
        );

        Self { root, xml }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }
}

impl fmt::Display for RateRequestDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xml)
    }
}

/// ISO-8601 UTC timestamp with two fractional-second digits, offset by
/// `future_day` days.
pub fn ship_timestamp(now: DateTime<Utc>, future_day: u32) -> String {
    let shipped = now
        .checked_add_days(Days::new(u64::from(future_day)))
        .unwrap_or_else(|| {
            warn!("Ship date {} days ahead is out of range, using today", future_day);
            now
        });
    let centis = shipped.timestamp_subsec_millis() / 10;
    format!("{}.{:02}Z", shipped.format("%Y-%m-%dT%H:%M:%S"), centis)
}

fn web_authentication_detail(credentials: &Credentials) -> Element {
    Element::new("WebAuthenticationDetail").child(
        Element::new("UserCredential")
            .child(Element::text("Key", &credentials.key))
            .child(Element::text("Password", &credentials.password)),
    )
}

fn client_detail(credentials: &Credentials) -> Element {
    Element::new("ClientDetail")
        .child(Element::text("AccountNumber", &credentials.account_number))
        .child(Element::text("MeterNumber", &credentials.meter))
        .child(
            Element::new("Localization")
                .child(Element::text("LanguageCode", "en"))
                .child(Element::text("LocaleCode", "us")),
        )
}

fn version() -> Element {
    Element::new("Version")
        .child(Element::text("ServiceId", SERVICE_ID))
        .child(Element::text("Major", SERVICE_VERSION))
        .child(Element::text("Intermediate", 0))
        .child(Element::text("Minor", 0))
}

fn requested_shipment(
    credentials: &Credentials,
    shipment: &ShipmentDescription,
    options: &RateOptions,
    now: DateTime<Utc>,
) -> Element {
    let saturday = options.saturday_rates.then(|| {
        Element::new("SpecialServicesRequested")
            .child(Element::text("SpecialServiceTypes", "SATURDAY_DELIVERY"))
    });

    let customs = options
        .customs_clearance
        .as_ref()
        .and_then(customs_clearance_detail);

    Element::new("RequestedShipment")
        .child(Element::text(
            "ShipTimestamp",
            ship_timestamp(now, options.future_day),
        ))
        .child(Element::text("DropoffType", options.effective_drop_off_type()))
        .child(Element::text("ServiceType", &shipment.service_type))
        .child(Element::text(
            "PackagingType",
            options.effective_packaging_type(),
        ))
        .child(shipment.shipper.to_element("Shipper", false))
        .child(shipment.recipient.to_element("Recipient", true))
        .child(shipping_charges_payment(credentials))
        .child_opt(saturday)
        .child_opt(customs)
        .child(Element::text(
            "RateRequestTypes",
            options.rate_request_type(),
        ))
        .child(Element::text("PackageCount", shipment.packages.len()))
        .children_from(shipment.packages.iter().map(|p| p.to_element()))
}

/// `CustomsClearanceDetail` from a JSON object. A list contributes only its
/// first entry; anything that is not an object is left out.
fn customs_clearance_detail(block: &Value) -> Option<Element> {
    let detail = match block {
        Value::Array(items) => {
            warn!(
                "Customs clearance given as a list of {} entries, using the first",
                items.len()
            );
            items.first()
        }
        other => Some(other),
    }
    .filter(|v| v.is_object());

    if detail.is_none() {
        warn!("Customs clearance detail is not an object, leaving it out");
    }

    detail.and_then(|v| {
        Element::from_value("CustomsClearanceDetail", v)
            .into_iter()
            .next()
    })
}

fn shipping_charges_payment(credentials: &Credentials) -> Element {
    Element::new("ShippingChargesPayment")
        .child(Element::text("PaymentType", "SENDER"))
        .child(
            Element::new("Payor").child(
                Element::new("ResponsibleParty")
                    .child(Element::text("AccountNumber", &credentials.account_number)),
            ),
        )
}
