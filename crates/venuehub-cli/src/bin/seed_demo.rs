use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use venuehub_api::auth::password::hash_password;
use venuehub_cli::{connect, init_tracing, SeedReport};
use venuehub_core::models::{
    CreateListingRequest, CreatePlanRequest, CreateProductRequest, CreateTenantRequest,
    ListParams, ListingKind, Location, PlanLimits, PriceConfig, PricingUnit, TenantModule, User,
    UserRole,
};
use venuehub_db::db::control::NewUser;
use venuehub_db::{ListingRepository, PlanRepository, ProductRepository, TenantRepository, UserRepository};

#[derive(Parser, Debug)]
#[command(name = "seed_demo")]
#[command(about = "Seed plans, demo accounts, a demo tenant with listings and a small shop")]
struct Args {
    /// Password for every demo account
    #[arg(long, env = "DEMO_PASSWORD", default_value = "DemoPass123!")]
    password: String,

    /// Slug of the demo tenant
    #[arg(long, default_value = "demo-arena")]
    tenant_slug: String,
}

fn money(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

fn demo_location() -> Location {
    Location {
        address: "12 Residency Road".to_string(),
        city: "Bengaluru".to_string(),
        state: Some("Karnataka".to_string()),
        country: "India".to_string(),
        latitude: Some(12.9716),
        longitude: Some(77.5946),
    }
}

fn listing(
    kind: ListingKind,
    title: &str,
    unit: PricingUnit,
    base: i64,
    weekend: Option<i64>,
    capacity: i32,
    amenities: &[&str],
) -> CreateListingRequest {
    CreateListingRequest {
        kind,
        title: title.to_string(),
        description: format!("{} at the VenueHub demo arena.", title),
        price_config: PriceConfig {
            base_price: money(base),
            currency: "INR".to_string(),
            unit,
            weekend_price: weekend.map(money),
            tax_percent: money(18),
        },
        location: demo_location(),
        capacity,
        images: Vec::new(),
        amenities: amenities.iter().map(|a| a.to_string()).collect(),
    }
}

fn plans() -> Vec<CreatePlanRequest> {
    vec![
        CreatePlanRequest {
            code: "starter".to_string(),
            name: "Starter".to_string(),
            description: Some("For a single venue getting started".to_string()),
            price_monthly: money(999),
            price_yearly: money(9990),
            currency: "INR".to_string(),
            limits: PlanLimits {
                max_listings: 5,
                max_bookings_per_month: 500,
                max_staff_users: 2,
            },
            features: vec!["bookings".to_string(), "reviews".to_string()],
        },
        CreatePlanRequest {
            code: "pro".to_string(),
            name: "Pro".to_string(),
            description: Some("Multiple venues, shop and custom branding".to_string()),
            price_monthly: money(2999),
            price_yearly: money(29990),
            currency: "INR".to_string(),
            limits: PlanLimits {
                max_listings: 50,
                max_bookings_per_month: 10_000,
                max_staff_users: 20,
            },
            features: vec![
                "bookings".to_string(),
                "reviews".to_string(),
                "shop".to_string(),
                "branding".to_string(),
            ],
        },
    ]
}

async fn ensure_user(
    users: &UserRepository,
    report: &mut SeedReport,
    email: &str,
    name: &str,
    role: UserRole,
    password_hash: &str,
) -> Result<User> {
    if let Some(existing) = users.get_by_email(email).await? {
        report.skip();
        return Ok(existing);
    }
    let created = users
        .create(NewUser {
            email,
            name,
            phone: None,
            password_hash,
            role,
            tenant_id: None,
        })
        .await?;
    report.created += 1;
    Ok(created)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let pool = connect().await?;
    let users = UserRepository::new(pool.clone());
    let tenants = TenantRepository::new(pool.clone());
    let plan_repository = PlanRepository::new(pool.clone());
    let listings = ListingRepository::new(pool.clone());
    let products = ProductRepository::new(pool);

    let mut report = SeedReport::default();
    for plan in plans() {
        report.record(plan_repository.create(&plan).await)?;
    }
    report.log("plans");
    let pro_plan = plan_repository
        .get_by_code("pro")
        .await?
        .context("Pro plan missing after seeding")?;

    let password_hash = hash_password(&args.password)?;
    let mut report = SeedReport::default();
    ensure_user(
        &users,
        &mut report,
        "admin@venuehub.local",
        "Platform Admin",
        UserRole::SuperAdmin,
        &password_hash,
    )
    .await?;
    let owner = ensure_user(
        &users,
        &mut report,
        "owner@venuehub.local",
        "Demo Venue Owner",
        UserRole::Customer,
        &password_hash,
    )
    .await?;
    ensure_user(
        &users,
        &mut report,
        "customer@venuehub.local",
        "Demo Customer",
        UserRole::Customer,
        &password_hash,
    )
    .await?;
    report.log("users");

    let mut report = SeedReport::default();
    let tenant = match tenants.get_by_slug(&args.tenant_slug).await? {
        Some(existing) => {
            report.skip();
            existing
        }
        None => {
            let created = tenants
                .create(&CreateTenantRequest {
                    name: "Demo Arena".to_string(),
                    slug: args.tenant_slug.clone(),
                    owner_user_id: owner.id,
                    modules: vec![
                        TenantModule::Turf,
                        TenantModule::Hotel,
                        TenantModule::Events,
                        TenantModule::Gym,
                        TenantModule::Wellness,
                        TenantModule::Shop,
                    ],
                    contact_email: Some("owner@venuehub.local".to_string()),
                    contact_phone: None,
                    plan_id: Some(pro_plan.id),
                })
                .await?;
            report.created += 1;
            created
        }
    };
    report.log("tenants");

    let mut report = SeedReport::default();
    let existing = listings
        .list_for_tenant(tenant.id, None, &ListParams::default())
        .await?;
    if existing.total > 0 {
        report.skip();
    } else {
        let demo_listings = [
            listing(
                ListingKind::Turf,
                "Five-a-side Turf",
                PricingUnit::PerHour,
                1200,
                Some(1500),
                10,
                &["Floodlights", "Changing Rooms", "Parking"],
            ),
            listing(
                ListingKind::Hotel,
                "Deluxe Room",
                PricingUnit::PerDay,
                4500,
                Some(5200),
                2,
                &["Wi-Fi", "Air Conditioning", "Restaurant"],
            ),
            listing(
                ListingKind::Event,
                "Rooftop Hall",
                PricingUnit::PerSlot,
                25000,
                None,
                150,
                &["Parking", "Air Conditioning", "Wheelchair Access"],
            ),
            listing(
                ListingKind::Gym,
                "Gym Day Pass",
                PricingUnit::PerPerson,
                300,
                None,
                40,
                &["Lockers", "Showers"],
            ),
            listing(
                ListingKind::Wellness,
                "Deep Tissue Massage",
                PricingUnit::PerHour,
                2200,
                None,
                1,
                &["Showers"],
            ),
        ];
        for request in &demo_listings {
            report.record(listings.create(tenant.id, request).await)?;
        }
    }
    report.log("listings");

    let mut report = SeedReport::default();
    let demo_products = [
        ("Football (Size 5)", "BALL-5", 899, 25, "Equipment"),
        ("Grip Socks", "SOCK-GRIP", 349, 60, "Apparel"),
        ("Energy Drink", "DRINK-NRG", 120, 200, "Refreshments"),
    ];
    for (name, sku, price, stock, category) in demo_products {
        let request = CreateProductRequest {
            name: name.to_string(),
            sku: sku.to_string(),
            description: None,
            price: money(price),
            currency: "INR".to_string(),
            stock,
            category: Some(category.to_string()),
            images: Vec::new(),
        };
        report.record(products.create(tenant.id, &request).await)?;
    }
    report.log("products");

    tracing::info!(
        tenant_id = %tenant.id,
        tenant_slug = %tenant.slug,
        "Demo data ready; sign in as owner@venuehub.local or customer@venuehub.local"
    );
    Ok(())
}
