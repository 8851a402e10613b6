use anyhow::Result;
use clap::Parser;
use venuehub_cli::{connect, init_tracing, SeedReport};
use venuehub_core::models::{
    CreateAmenityRequest, CreateCurrencyRequest, CreatePricingModelRequest,
};
use venuehub_db::CatalogRepository;

#[derive(Parser, Debug)]
#[command(name = "seed_catalog")]
#[command(about = "Seed platform amenities, currencies and pricing models")]
struct Args {
    /// Skip amenities
    #[arg(long)]
    no_amenities: bool,
}

const AMENITIES: &[(&str, &str)] = &[
    ("Parking", "car"),
    ("Wi-Fi", "wifi"),
    ("Changing Rooms", "shirt"),
    ("Floodlights", "lightbulb"),
    ("Showers", "shower-head"),
    ("Drinking Water", "droplet"),
    ("Air Conditioning", "snowflake"),
    ("Swimming Pool", "waves"),
    ("Restaurant", "utensils"),
    ("First Aid", "cross"),
    ("Lockers", "lock"),
    ("Wheelchair Access", "accessibility"),
];

const CURRENCIES: &[(&str, &str, &str)] = &[
    ("INR", "₹", "Indian Rupee"),
    ("USD", "$", "US Dollar"),
    ("EUR", "€", "Euro"),
    ("GBP", "£", "Pound Sterling"),
    ("AED", "د.إ", "UAE Dirham"),
];

const PRICING_MODELS: &[(&str, &str, &str)] = &[
    ("per-slot", "Per slot", "Fixed price for each booked time slot"),
    ("per-hour", "Per hour", "Price multiplied by the booked hours"),
    ("per-day", "Per day", "Nightly or daily rate"),
    ("per-person", "Per person", "Price multiplied by the guest count"),
];

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let catalog = CatalogRepository::new(connect().await?);

    if !args.no_amenities {
        let mut report = SeedReport::default();
        for (name, icon) in AMENITIES {
            let request = CreateAmenityRequest {
                name: name.to_string(),
                icon: Some(icon.to_string()),
            };
            report.record(catalog.create_amenity(&request).await)?;
        }
        report.log("amenities");
    }

    let mut report = SeedReport::default();
    for (code, symbol, name) in CURRENCIES {
        let request = CreateCurrencyRequest {
            code: code.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            is_active: true,
        };
        report.record(catalog.create_currency(&request).await)?;
    }
    report.log("currencies");

    let mut report = SeedReport::default();
    for (code, name, description) in PRICING_MODELS {
        let request = CreatePricingModelRequest {
            code: code.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
        };
        report.record(catalog.create_pricing_model(&request).await)?;
    }
    report.log("pricing models");

    Ok(())
}
