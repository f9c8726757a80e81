//! Cron entry point: sweeps overdue schedules, then sends reminders and overdue notices.

use budget_scheduler::{
    config::{database, scheduler},
    core::{
        currency,
        reminder::{self, LogDispatcher},
        sweep::{self, SweepScope},
    },
    errors::{Error, Result},
};
use chrono::{TimeDelta, Utc};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load scheduler configuration
    let config = scheduler::load_default_config()
        .inspect_err(|e| error!("Failed to load scheduler configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    currency::seed_currencies(&db, &config.currencies)
        .await
        .inspect(|count| info!("Seeded {} currencies.", count))
        .inspect_err(|e| error!("Failed to seed currencies: {}", e))?;

    // 5. One pass of the scheduled jobs
    let now = Utc::now();
    sweep::sweep_overdue(&db, &SweepScope::All, now)
        .await
        .inspect_err(|e| error!("Overdue sweep failed: {}", e))?;

    reminder::dispatch_reminders(&db, &LogDispatcher, now, config.reminder_lookahead_days)
        .await
        .inspect_err(|e| error!("Reminder dispatch failed: {}", e))?;

    let since = TimeDelta::try_days(config.overdue_window_days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| Error::Config {
            message: format!(
                "overdue_window_days {} is out of range",
                config.overdue_window_days
            ),
        })?;
    reminder::dispatch_overdue_notifications(&db, &LogDispatcher, since, now)
        .await
        .inspect_err(|e| error!("Overdue notification failed: {}", e))?;

    info!("Scheduler run complete.");
    Ok(())
}
