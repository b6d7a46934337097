use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use shiprate::{Credentials, RateDetails, RateOptions, RateResult, RateService, ShipmentDescription};
use std::path::{Path, PathBuf};

/// shiprate - FedEx rate quotes
///
/// Credentials are read from FEDEX_KEY, FEDEX_PASSWORD, FEDEX_ACCOUNT_NUMBER,
/// FEDEX_METER and FEDEX_MODE (test or production).
///
/// Examples:
///   shiprate quote shipment.json --saturday
#[derive(Parser, Debug)]
#[command(author, version = env!("SHIPRATE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Request a rate quote for a shipment
    Quote(QuoteArgs),

    /// Print the rate request XML without sending it
    Request(QuoteArgs),
}

#[derive(clap::Args, Debug)]
struct QuoteArgs {
    /// Shipment description as JSON
    #[arg(value_name = "SHIPMENT_JSON")]
    shipment: PathBuf,

    /// Request Saturday-delivery list rates
    #[arg(long)]
    saturday: bool,

    /// Ship this many days from today
    #[arg(long, value_name = "DAYS", default_value_t = 0)]
    future_day: u32,

    /// Customs clearance detail as JSON
    #[arg(long, value_name = "JSON_FILE")]
    customs: Option<PathBuf>,

    /// Drop-off type (defaults to REGULAR_PICKUP)
    #[arg(long)]
    drop_off_type: Option<String>,

    /// Packaging type (defaults to YOUR_PACKAGING)
    #[arg(long)]
    packaging_type: Option<String>,

    /// Rate service URL (overrides the FEDEX_MODE endpoint)
    #[arg(long, env = "SHIPRATE_ENDPOINT", value_name = "URL")]
    endpoint: Option<String>,
}

impl QuoteArgs {
    fn options(&self) -> Result<RateOptions> {
        let customs_clearance = self
            .customs
            .as_deref()
            .map(read_json::<serde_json::Value>)
            .transpose()?;
        Ok(RateOptions {
            saturday_rates: self.saturday,
            future_day: self.future_day,
            customs_clearance,
            drop_off_type: self.drop_off_type.clone(),
            packaging_type: self.packaging_type.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Quote(args) => quote(&args).await,
        Commands::Request(args) => {
            let (service, shipment, options) = prepare(&args)?;
            println!("{}", service.build_request(&shipment, &options));
            Ok(())
        }
    }
}

async fn quote(args: &QuoteArgs) -> Result<()> {
    let (service, shipment, options) = prepare(args)?;
    match service.get_rate_quote(&shipment, &options).await {
        RateResult::Success(details) => {
            print_details(&details);
            Ok(())
        }
        RateResult::Failure(message) => anyhow::bail!(message),
    }
}

fn prepare(
    args: &QuoteArgs,
) -> Result<(RateService<shiprate::http::HttpTransport>, ShipmentDescription, RateOptions)> {
    let shipment: ShipmentDescription = read_json(&args.shipment)?;
    let options = args.options()?;
    let credentials = Credentials::from_env()?;

    let mut service = RateService::from_credentials(credentials)?;
    if let Some(endpoint) = &args.endpoint {
        service = service.with_endpoint(endpoint.clone());
    }
    Ok((service, shipment, options))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_details(details: &RateDetails) {
    let rows = [
        ("Rate type", details.rate_type().map(str::to_string)),
        ("Rate zone", details.rate_zone().map(str::to_string)),
        ("Billing weight", details.total_billing_weight()),
        ("Base charge", details.total_base_charge().map(|m| m.to_string())),
        (
            "Freight discounts",
            details.total_freight_discounts().map(|m| m.to_string()),
        ),
        ("Net freight", details.total_net_freight().map(|m| m.to_string())),
        ("Surcharges", details.total_surcharges().map(|m| m.to_string())),
        ("Taxes", details.total_taxes().map(|m| m.to_string())),
        ("Net charge", details.total_net_charge().map(|m| m.to_string())),
    ];

    for (label, value) in rows {
        if let Some(value) = value {
            println!("{:<18} {}", format!("{}:", label), value);
        }
    }
}
