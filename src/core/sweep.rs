//! Overdue sweep - Moves `PENDING` schedules whose due date has passed to `OVERDUE`.
//!
//! The sweep is a single bulk `UPDATE` that touches only the status column, so it
//! is safe to run concurrently and repeatedly: a second run finds nothing left to
//! change. It is triggered externally (cron) and before every listing.

use crate::{
    entities::{ScheduleStatus, ScheduledTransaction, scheduled_transaction},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// Which schedules a sweep covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepScope {
    /// Only schedules owned by this user
    User(String),
    /// Every user's schedules
    All,
}

/// Marks every `PENDING` schedule in `scope` with `due_date < now` as `OVERDUE`.
///
/// # Returns
/// The number of schedules that changed status.
#[instrument(skip(db))]
pub async fn sweep_overdue<C>(db: &C, scope: &SweepScope, now: DateTime<Utc>) -> Result<u64>
where
    C: ConnectionTrait,
{
    let mut update = ScheduledTransaction::update_many()
        .col_expr(
            scheduled_transaction::Column::Status,
            Expr::value(ScheduleStatus::Overdue),
        )
        .filter(scheduled_transaction::Column::Status.eq(ScheduleStatus::Pending))
        .filter(scheduled_transaction::Column::DueDate.lt(now));
    if let SweepScope::User(user_id) = scope {
        update = update.filter(scheduled_transaction::Column::UserId.eq(user_id.as_str()));
    }

    let result = update.exec(db).await?;
    if result.rows_affected > 0 {
        info!(count = result.rows_affected, "Marked schedules overdue");
    } else {
        debug!("No schedules to mark overdue");
    }
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{account, schedule};
    use crate::test_utils::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_sweep_marks_only_past_due_pending() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        let now = utc(2024, 6, 15);

        let past = create_test_schedule(&db, account.id, utc(2024, 6, 1)).await?;
        let future = create_test_schedule(&db, account.id, utc(2024, 7, 1)).await?;
        let cancelled = create_test_schedule(&db, account.id, utc(2024, 6, 2)).await?;
        schedule::cancel_schedule(&db, cancelled.id, TEST_USER).await?;

        let affected = sweep_overdue(&db, &SweepScope::All, now).await?;
        assert_eq!(affected, 1);

        let past = schedule::get_schedule(&db, past.id, TEST_USER).await?;
        assert_eq!(past.status, ScheduleStatus::Overdue);
        let future = schedule::get_schedule(&db, future.id, TEST_USER).await?;
        assert_eq!(future.status, ScheduleStatus::Pending);
        let cancelled = schedule::get_schedule(&db, cancelled.id, TEST_USER).await?;
        assert_eq!(cancelled.status, ScheduleStatus::Cancelled);

        Ok(())
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        let now = utc(2024, 6, 15);
        for day in [1, 5, 10, 20] {
            create_test_schedule(&db, account.id, utc(2024, 6, day)).await?;
        }

        let first = sweep_overdue(&db, &SweepScope::All, now).await?;
        let after_first = ScheduledTransaction::find().all(&db).await?;

        let second = sweep_overdue(&db, &SweepScope::All, now).await?;
        let after_second = ScheduledTransaction::find().all(&db).await?;

        assert_eq!(first, 3);
        assert_eq!(second, 0);
        assert_eq!(after_first, after_second);

        Ok(())
    }

    #[tokio::test]
    async fn test_sweep_touches_only_status() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        let before = create_test_schedule(&db, account.id, utc(2024, 6, 1)).await?;
        crate::core::reminder::mark_reminded(&db, before.id).await?;
        let before = schedule::get_schedule(&db, before.id, TEST_USER).await?;

        sweep_overdue(&db, &SweepScope::All, utc(2024, 6, 15)).await?;
        let after = schedule::get_schedule(&db, before.id, TEST_USER).await?;

        assert_eq!(after.status, ScheduleStatus::Overdue);
        assert_eq!(
            scheduled_transaction::Model {
                status: before.status,
                ..after
            },
            before
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_sweep_user_scope() -> Result<()> {
        let (db, account) = setup_with_account().await?;
        let other = account::create_account(&db, "other_user", "Other", "JPY", Decimal::ZERO)
            .await?;

        let mine = create_test_schedule(&db, account.id, utc(2024, 6, 1)).await?;
        let theirs = schedule::create_schedule(
            &db,
            "other_user",
            schedule_args(other.id, utc(2024, 6, 1)),
        )
        .await?;

        let affected =
            sweep_overdue(&db, &SweepScope::User(TEST_USER.to_string()), utc(2024, 6, 15)).await?;
        assert_eq!(affected, 1);

        let mine = schedule::get_schedule(&db, mine.id, TEST_USER).await?;
        let theirs = schedule::get_schedule(&db, theirs.id, "other_user").await?;
        assert_eq!(mine.status, ScheduleStatus::Overdue);
        assert_eq!(theirs.status, ScheduleStatus::Pending);

        Ok(())
    }
}
