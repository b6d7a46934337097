//! Client for the FedEx rate web service (schema v13).
//!
//! [`RateService::get_rate_quote`] builds a [`RateRequestDocument`], posts it
//! through a [`http::Transport`] and reduces the reply to a [`RateResult`].

pub mod credentials;
pub mod http;
pub mod rate;
pub mod request;
pub mod response;
pub mod shipment;
pub mod xml;

pub use credentials::{Credentials, Mode};
pub use rate::RateService;
pub use request::{RateOptions, RateRequestDocument};
pub use response::{Money, RateDetails, RateResult, ServiceReply};
pub use shipment::ShipmentDescription;
