use anyhow::Result;
use clap::Parser;
use venuehub_cli::{connect, init_tracing, SeedReport};
use venuehub_core::models::{CreatePolicyRequest, PolicyType};
use venuehub_db::PolicyRepository;

#[derive(Parser, Debug)]
#[command(name = "seed_policies")]
#[command(about = "Seed platform-wide legal documents")]
struct Args {
    /// Publish a new version even when an active one exists
    #[arg(long)]
    force: bool,
}

fn document(policy_type: PolicyType) -> (&'static str, &'static str) {
    match policy_type {
        PolicyType::Terms => (
            "Terms of Service",
            "By creating an account or making a booking on VenueHub you agree to these terms. \
             Venue operators are responsible for the accuracy of their listings and for honouring \
             confirmed bookings. Customers must arrive on time and follow venue rules.",
        ),
        PolicyType::Privacy => (
            "Privacy Policy",
            "We collect the account, booking and payment details needed to operate the marketplace. \
             Booking details are shared with the venue you book. We never sell personal data and \
             you may request deletion of your account at any time.",
        ),
        PolicyType::Refund => (
            "Refund Policy",
            "Refunds for cancelled bookings are issued to the original payment method. Amounts \
             and timelines depend on the venue's cancellation policy and the time of cancellation.",
        ),
        PolicyType::Cancellation => (
            "Cancellation Policy",
            "Pending and confirmed bookings may be cancelled from your account. Cancellations made \
             at least 24 hours before the booked slot are eligible for a full refund unless the \
             venue states otherwise.",
        ),
        PolicyType::Cookie => (
            "Cookie Policy",
            "VenueHub uses strictly necessary cookies for sessions and CSRF protection. No \
             advertising cookies are set.",
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let policies = PolicyRepository::new(connect().await?);
    let mut report = SeedReport::default();

    for policy_type in [
        PolicyType::Terms,
        PolicyType::Privacy,
        PolicyType::Refund,
        PolicyType::Cancellation,
        PolicyType::Cookie,
    ] {
        if !args.force && policies.current(policy_type, None).await?.is_some() {
            report.skip();
            continue;
        }
        let (title, content) = document(policy_type);
        let request = CreatePolicyRequest {
            policy_type,
            title: title.to_string(),
            content: content.to_string(),
            effective_from: None,
            is_active: true,
        };
        if let Some(created) = report.record(policies.create(None, &request).await)? {
            tracing::info!(
                policy_type = ?policy_type,
                version = created.version,
                "Published platform policy"
            );
        }
    }

    report.log("policies");
    Ok(())
}
