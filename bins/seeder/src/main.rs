//! Database seeder for payroll development and testing.
//!
//! Seeds the bootstrap admin account and the two advance periods, then
//! prints an access token for the admin so the API can be tried without a
//! login flow.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use payroll_core::account::Role;
use payroll_db::{AccountRepository, AdvanceRepository, CreateAccountInput};
use payroll_shared::jwt::{JwtConfig, JwtService};
use payroll_shared::{AppConfig, BusinessClock};

/// Username of the bootstrap admin.
const ADMIN_USERNAME: &str = "admin";
/// Password used when `PAYROLL_SEED_ADMIN_PASSWORD` is not set.
const DEV_ADMIN_PASSWORD: &str = "admin1234";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    println!("Connecting to database...");
    let db = payroll_db::connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    println!("Seeding admin account...");
    let accounts = AccountRepository::new(db.clone());
    let admin = match accounts.find_by_username(ADMIN_USERNAME).await? {
        Some(admin) => {
            println!("  Admin account already exists, skipping...");
            admin
        }
        None => {
            let password = std::env::var("PAYROLL_SEED_ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEV_ADMIN_PASSWORD.to_string());
            let admin = accounts
                .create(CreateAccountInput {
                    username: ADMIN_USERNAME.to_string(),
                    employee_id: None,
                    first_name: "System".to_string(),
                    last_name: "Admin".to_string(),
                    role: Role::Admin,
                    password,
                    must_change_password: false,
                })
                .await?;
            println!("  Created admin account: {}", admin.username);
            admin
        }
    };

    println!("Seeding advance periods...");
    let clock = BusinessClock::from_name(&config.business.time_zone)?;
    let periods = AdvanceRepository::new(db).periods(clock.today()).await?;
    for period in &periods {
        println!(
            "  {} period: {} .. {} (active: {})",
            period.advance_type, period.start_date, period.end_date, period.is_active
        );
    }

    let jwt = JwtService::new(JwtConfig::from(&config.jwt));
    let token = jwt.generate_access_token(admin.id, Role::Admin.as_str())?;
    println!("Seeding complete!");
    println!();
    println!("Development access token for '{ADMIN_USERNAME}':");
    println!("{token}");

    Ok(())
}
