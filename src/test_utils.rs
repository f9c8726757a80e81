//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::scheduler::CurrencyConfig,
    core::{account, currency, schedule},
    entities::{self, Frequency, TransactionType},
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Owner of every fixture unless a test says otherwise.
pub const TEST_USER: &str = "test_user";

/// Routes `tracing` output through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables and the JPY and USD currencies.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    currency::seed_currencies(
        &db,
        &[
            CurrencyConfig {
                code: "JPY".to_string(),
                name: "Japanese Yen".to_string(),
                symbol: "¥".to_string(),
            },
            CurrencyConfig {
                code: "USD".to_string(),
                name: "US Dollar".to_string(),
                symbol: "$".to_string(),
            },
        ],
    )
    .await?;
    Ok(db)
}

/// A fixed instant at 09:00 UTC, so tests do not depend on the wall clock.
///
/// # Panics
/// Panics on an invalid calendar date.
#[allow(clippy::unwrap_used)]
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap()
}

/// Creates a JPY account for [`TEST_USER`] holding 1000.
pub async fn create_test_account(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::account::Model> {
    account::create_account(db, TEST_USER, name, "JPY", Decimal::from(1000)).await
}

/// Default arguments for a one-off JPY expense of 100 on the given account.
///
/// # Defaults
/// * `description`: `"Test schedule"`
/// * `reminder_days`: 3
/// * not recurring, no category, no notes
pub fn schedule_args(account_id: i64, due_date: DateTime<Utc>) -> schedule::CreateScheduleArgs {
    schedule::CreateScheduleArgs {
        account_id,
        category_id: None,
        amount: Decimal::from(100),
        currency_code: "JPY".to_string(),
        transaction_type: TransactionType::Expense,
        description: "Test schedule".to_string(),
        notes: None,
        due_date,
        is_recurring: false,
        frequency: None,
        end_date: None,
        reminder_days: 3,
    }
}

/// Creates a one-off schedule with [`schedule_args`] defaults.
pub async fn create_test_schedule(
    db: &DatabaseConnection,
    account_id: i64,
    due_date: DateTime<Utc>,
) -> Result<entities::scheduled_transaction::Model> {
    schedule::create_schedule(db, TEST_USER, schedule_args(account_id, due_date)).await
}

/// Creates a recurring schedule with the given frequency and optional end date.
pub async fn create_recurring_schedule(
    db: &DatabaseConnection,
    account_id: i64,
    due_date: DateTime<Utc>,
    frequency: Frequency,
    end_date: Option<DateTime<Utc>>,
) -> Result<entities::scheduled_transaction::Model> {
    let args = schedule::CreateScheduleArgs {
        is_recurring: true,
        frequency: Some(frequency),
        end_date,
        ..schedule_args(account_id, due_date)
    };
    schedule::create_schedule(db, TEST_USER, args).await
}

/// Sets up a complete test environment with an account.
/// Returns (db, account) for common test scenarios.
pub async fn setup_with_account() -> Result<(DatabaseConnection, entities::account::Model)> {
    let db = setup_test_db().await?;
    let account = create_test_account(&db, "Test Account").await?;
    Ok((db, account))
}
