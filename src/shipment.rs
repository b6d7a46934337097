//! Shipment description consumed by the request builder.
//!
//! These types are assumed to be validated by whoever assembles them; the
//! builder only serializes what it is given.

use serde::{Deserialize, Serialize};

use crate::xml::Element;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentDescription {
    pub shipper: Party,
    pub recipient: Party,
    pub packages: Vec<Package>,
    /// e.g. `FEDEX_GROUND`, `PRIORITY_OVERNIGHT`
    pub service_type: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub contact: Contact,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub person_name: Option<String>,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street_lines: Vec<String>,
    pub city: Option<String>,
    pub state_or_province_code: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: String,
    pub residential: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub weight: Weight,
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    /// `LB` or `KG`
    pub units: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: u32,
    pub width: u32,
    pub height: u32,
    /// `IN` or `CM`
    pub units: String,
}

/// The service accepts at most two street lines per address.
const MAX_STREET_LINES: usize = 2;

impl Party {
    pub(crate) fn to_element(&self, name: &str, with_residential: bool) -> Element {
        Element::new(name)
            .child(self.contact.to_element())
            .child(self.address.to_element(with_residential))
    }
}

impl Contact {
    fn to_element(&self) -> Element {
        Element::new("Contact")
            .child_opt(Element::opt_text("PersonName", self.person_name.as_deref()))
            .child_opt(Element::opt_text("CompanyName", self.company_name.as_deref()))
            .child_opt(Element::opt_text("PhoneNumber", self.phone_number.as_deref()))
    }
}

impl Address {
    fn to_element(&self, with_residential: bool) -> Element {
        let residential = if with_residential {
            self.residential
        } else {
            None
        };

        Element::new("Address")
            .children_from(
                self.street_lines
                    .iter()
                    .take(MAX_STREET_LINES)
                    .map(|line| Element::text("StreetLines", line)),
            )
            .child_opt(Element::opt_text("City", self.city.as_deref()))
            .child_opt(Element::opt_text(
                "StateOrProvinceCode",
                self.state_or_province_code.as_deref(),
            ))
            .child_opt(Element::opt_text("PostalCode", self.postal_code.as_deref()))
            .child(Element::text("CountryCode", &self.country_code))
            .child_opt(Element::opt_text("Residential", residential))
    }
}

impl Package {
    pub(crate) fn to_element(&self) -> Element {
        let weight = Element::new("Weight")
            .child(Element::text("Units", &self.weight.units))
            .child(Element::text("Value", self.weight.value));

        let dimensions = self.dimensions.as_ref().map(|d| {
            Element::new("Dimensions")
                .child(Element::text("Length", d.length))
                .child(Element::text("Width", d.width))
                .child(Element::text("Height", d.height))
                .child(Element::text("Units", &d.units))
        });

        Element::new("RequestedPackageLineItems")
            .child(Element::text("GroupPackageCount", 1))
            .child(weight)
            .child_opt(dimensions)
    }
}
