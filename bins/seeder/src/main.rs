//! Database seeder for FinWise development and testing.
//!
//! Seeds a demo user with a few transactions and monthly budgets, going
//! through the real repositories so the seeded budgets come out reconciled.
//!
//! Usage: cargo run --bin seeder

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use finwise_core::auth::hash_password;
use finwise_core::budget::Month;
use finwise_db::repositories::{CreateTransactionInput, UpsertMonthlyBudgetInput};
use finwise_db::{BudgetRepository, TransactionRepository, UserRepository};

/// Demo user credentials.
const DEMO_EMAIL: &str = "demo@finwise.dev";
const DEMO_PASSWORD: &str = "demo-password";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = finwise_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo user...");
    let user_id = seed_demo_user(&db).await;

    println!("Seeding budgets...");
    seed_budgets(&db, user_id).await;

    println!("Seeding transactions...");
    seed_transactions(&db, user_id).await;

    println!("Seeding complete! Sign in as {DEMO_EMAIL} / {DEMO_PASSWORD}");
}

async fn seed_demo_user(db: &DatabaseConnection) -> Uuid {
    let users = UserRepository::new(db.clone());

    if let Some(existing) = users
        .find_by_email(DEMO_EMAIL)
        .await
        .expect("Failed to look up demo user")
    {
        println!("  demo user already exists, reusing");
        return existing.id;
    }

    let password_hash = hash_password(DEMO_PASSWORD).expect("Failed to hash demo password");
    let user = users
        .create(DEMO_EMAIL, &password_hash)
        .await
        .expect("Failed to create demo user");

    user.id
}

async fn seed_budgets(db: &DatabaseConnection, user_id: Uuid) {
    let budgets = BudgetRepository::new(db.clone());

    for (category, month, amount) in [
        ("Food", "2025-02", "500"),
        ("Food", "2025-03", "500"),
        ("Transport", "2025-02", "150"),
        ("Rent", "2025-02", "1200"),
    ] {
        budgets
            .upsert_monthly(UpsertMonthlyBudgetInput {
                user_id,
                category: category.to_string(),
                month: Month::from_str(month).expect("seed month is valid"),
                amount: Decimal::from_str(amount).expect("seed amount is valid"),
                start_date: None,
                end_date: None,
            })
            .await
            .expect("Failed to seed budget");
    }
}

async fn seed_transactions(db: &DatabaseConnection, user_id: Uuid) {
    let transactions = TransactionRepository::new(db.clone());
    let budgets = BudgetRepository::new(db.clone());

    for (amount, category, date, description) in [
        ("50", "Food", "2025-02-27", Some("Lunch")),
        ("23.40", "Food", "2025-02-14", Some("Groceries")),
        ("12", "Transport", "2025-02-03", Some("Bus pass")),
        ("1200", "Rent", "2025-02-01", None),
        ("31.75", "Food", "2025-03-02", Some("Groceries")),
    ] {
        let date = NaiveDate::from_str(date).expect("seed date is valid");

        transactions
            .create(CreateTransactionInput {
                user_id,
                amount: Decimal::from_str(amount).expect("seed amount is valid"),
                category: category.to_string(),
                date,
                description: description.map(String::from),
            })
            .await
            .expect("Failed to seed transaction");

        budgets
            .reconcile(user_id, category, date)
            .await
            .expect("Failed to reconcile seeded budgets");
    }
}
