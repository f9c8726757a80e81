//! Execution engine - Turns a due schedule into a realized transaction.
//!
//! Executing a schedule performs, inside one database transaction:
//!
//! 1. re-read the schedule and check it is still `PENDING` or `OVERDUE`
//! 2. insert the realized transaction
//! 3. apply the signed amount to the account balance
//! 4. mark the schedule `COMPLETED`, guarded on its status still being open
//! 5. for recurring schedules, insert the next occurrence unless the end date
//!    has been passed
//!
//! Any failure drops the transaction, which rolls back every step. Executing an
//! already completed schedule is rejected with `InvalidState`, so retrying a
//! request never books the same obligation twice.

use crate::{
    core::{
        ledger, recurrence,
        schedule::{OPEN_STATUSES, get_schedule, invalid_state},
        transaction::{CreateTransactionArgs, insert_transaction},
    },
    entities::{ScheduleStatus, ScheduledTransaction, scheduled_transaction, transaction},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::NotSet, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// Options for [`execute_schedule`].
#[derive(Debug, Clone, Copy)]
pub struct ExecuteOptions {
    /// Date of the realized transaction and `completed_at`; defaults to now
    pub execution_date: Option<DateTime<Utc>>,
    /// Whether a recurring schedule spawns its next occurrence
    pub create_recurring: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            execution_date: None,
            create_recurring: true,
        }
    }
}

/// Everything an execution changed.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// The realized transaction
    pub transaction: transaction::Model,
    /// The executed schedule, now `COMPLETED`
    pub completed: scheduled_transaction::Model,
    /// The next occurrence, if one was created
    pub next: Option<scheduled_transaction::Model>,
}

/// Builds the description of the realized transaction, pointing back at its schedule.
fn realized_description(schedule: &scheduled_transaction::Model) -> String {
    format!("{} (scheduled #{})", schedule.description, schedule.id)
}

/// Inserts the occurrence following `schedule`, or returns `None` when recurrence has ended.
async fn spawn_successor<C>(
    db: &C,
    schedule: &scheduled_transaction::Model,
    now: DateTime<Utc>,
) -> Result<Option<scheduled_transaction::Model>>
where
    C: ConnectionTrait,
{
    let Some(frequency) = schedule.frequency.filter(|_| schedule.is_recurring) else {
        return Ok(None);
    };

    let next_due = recurrence::next_due_date(schedule.due_date, frequency)?;
    if !recurrence::should_continue(next_due, schedule.end_date) {
        debug!(schedule_id = schedule.id, %next_due, "Recurrence ended");
        return Ok(None);
    }

    let successor = scheduled_transaction::ActiveModel {
        id: NotSet,
        user_id: Set(schedule.user_id.clone()),
        account_id: Set(schedule.account_id),
        category_id: Set(schedule.category_id),
        amount: Set(schedule.amount),
        currency_code: Set(schedule.currency_code.clone()),
        transaction_type: Set(schedule.transaction_type),
        description: Set(schedule.description.clone()),
        notes: Set(schedule.notes.clone()),
        due_date: Set(next_due),
        frequency: Set(schedule.frequency),
        end_date: Set(schedule.end_date),
        is_recurring: Set(true),
        status: Set(ScheduleStatus::Pending),
        completed_at: Set(None),
        reminder_days: Set(schedule.reminder_days),
        is_reminder_sent: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(Some(successor))
}

/// Executes one open schedule atomically.
///
/// # Arguments
/// * `db` - Database connection
/// * `schedule_id` - Schedule to execute
/// * `user_id` - Calling user; must own the schedule
/// * `options` - Execution date and whether to spawn the next occurrence
///
/// # Errors
/// * `NotFound` - no such schedule for this user
/// * `InvalidState` - the schedule is `COMPLETED` or `CANCELLED`, including when a
///   concurrent execution committed first
/// * `Database` - any storage failure; nothing is applied
#[instrument(skip(db, options))]
pub async fn execute_schedule(
    db: &DatabaseConnection,
    schedule_id: i64,
    user_id: &str,
    options: ExecuteOptions,
) -> Result<ExecutionOutcome> {
    let now = Utc::now();
    let execution_date = options.execution_date.unwrap_or(now);

    let txn = db.begin().await?;

    let schedule = get_schedule(&txn, schedule_id, user_id).await?;
    if !schedule.status.is_open() {
        return Err(invalid_state(&schedule, "execute"));
    }

    let transaction = insert_transaction(
        &txn,
        user_id,
        &CreateTransactionArgs {
            account_id: schedule.account_id,
            category_id: schedule.category_id,
            amount: schedule.amount,
            currency_code: schedule.currency_code.clone(),
            transaction_type: schedule.transaction_type,
            description: realized_description(&schedule),
            notes: schedule.notes.clone(),
            date: execution_date,
        },
    )
    .await?;

    ledger::apply_delta(
        &txn,
        schedule.account_id,
        ledger::signed_amount(schedule.transaction_type, schedule.amount),
    )
    .await?;

    let result = ScheduledTransaction::update_many()
        .col_expr(
            scheduled_transaction::Column::Status,
            Expr::value(ScheduleStatus::Completed),
        )
        .col_expr(
            scheduled_transaction::Column::CompletedAt,
            Expr::value(execution_date),
        )
        .col_expr(scheduled_transaction::Column::UpdatedAt, Expr::value(now))
        .filter(scheduled_transaction::Column::Id.eq(schedule_id))
        .filter(scheduled_transaction::Column::Status.is_in(OPEN_STATUSES))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        let current = get_schedule(&txn, schedule_id, user_id).await?;
        return Err(invalid_state(&current, "execute"));
    }

    let next = if options.create_recurring {
        spawn_successor(&txn, &schedule, now).await?
    } else {
        None
    };

    let completed = get_schedule(&txn, schedule_id, user_id).await?;
    txn.commit().await?;

    info!(
        schedule_id,
        transaction_id = transaction.id,
        next_schedule_id = next.as_ref().map(|s| s.id),
        "Executed scheduled transaction"
    );

    Ok(ExecutionOutcome {
        transaction,
        completed,
        next,
    })
}
