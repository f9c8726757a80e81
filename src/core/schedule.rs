//! Scheduled transaction store - Creation, lookup, editing and listing of schedules.
//!
//! All operations are scoped to the calling user: a schedule owned by somebody else
//! is reported as not found. Only open schedules (`PENDING`/`OVERDUE`) may be edited
//! or cancelled; `COMPLETED` and `CANCELLED` are terminal.
//!
//! Listings run the overdue sweep for the user first and are ordered by status rank
//! (PENDING, OVERDUE, COMPLETED, CANCELLED), then by due date, so urgent items come
//! first.

use crate::{
    entities::{
        Frequency, ScheduleStatus, ScheduledTransaction, TransactionType, scheduled_transaction,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// Statuses in which a schedule can still be changed.
pub(crate) const OPEN_STATUSES: [ScheduleStatus; 2] =
    [ScheduleStatus::Pending, ScheduleStatus::Overdue];

const MAX_PAGE_SIZE: u64 = 100;

/// Input for [`create_schedule`].
#[derive(Debug, Clone)]
pub struct CreateScheduleArgs {
    pub account_id: i64,
    pub category_id: Option<i64>,
    /// Must be strictly positive
    pub amount: Decimal,
    pub currency_code: String,
    pub transaction_type: TransactionType,
    pub description: String,
    pub notes: Option<String>,
    pub due_date: DateTime<Utc>,
    pub is_recurring: bool,
    /// Required when `is_recurring` is true
    pub frequency: Option<Frequency>,
    pub end_date: Option<DateTime<Utc>>,
    /// Days before `due_date` at which the reminder becomes due
    pub reminder_days: i32,
}

/// Partial update for [`update_schedule`].
///
/// `None` leaves a field unchanged. Nullable fields use `Some(None)` to clear them.
#[derive(Debug, Clone, Default)]
pub struct UpdateScheduleArgs {
    pub account_id: Option<i64>,
    pub category_id: Option<Option<i64>>,
    pub amount: Option<Decimal>,
    pub currency_code: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub description: Option<String>,
    pub notes: Option<Option<String>>,
    pub due_date: Option<DateTime<Utc>>,
    pub is_recurring: Option<bool>,
    pub frequency: Option<Option<Frequency>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub reminder_days: Option<i32>,
    /// Only `PENDING` and `OVERDUE` are accepted; use execute or cancel otherwise
    pub status: Option<ScheduleStatus>,
}

/// Optional filters for [`list_schedules`]. Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub status: Option<ScheduleStatus>,
    pub transaction_type: Option<TransactionType>,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub is_recurring: Option<bool>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Paginated<T> {
    /// Number of pages needed to show `total` items. A zero `limit` counts as one.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return self.total;
        }
        self.total.div_ceil(self.limit)
    }
}

/// The field values that must jointly satisfy the schedule invariants.
struct ScheduleFields<'a> {
    amount: Decimal,
    description: &'a str,
    due_date: DateTime<Utc>,
    is_recurring: bool,
    frequency: Option<Frequency>,
    end_date: Option<DateTime<Utc>>,
    reminder_days: i32,
}

fn validate_fields(fields: &ScheduleFields<'_>) -> Result<()> {
    if fields.amount <= Decimal::ZERO {
        return Err(Error::validation(format!(
            "Amount must be greater than zero, got {}",
            fields.amount
        )));
    }
    if fields.description.trim().is_empty() {
        return Err(Error::validation("Description cannot be empty"));
    }
    if fields.reminder_days < 0 {
        return Err(Error::validation("Reminder days cannot be negative"));
    }
    if fields.is_recurring && fields.frequency.is_none() {
        return Err(Error::validation(
            "Recurring schedules require a frequency",
        ));
    }
    if let Some(end_date) = fields.end_date {
        if end_date < fields.due_date {
            return Err(Error::validation("End date cannot be before the due date"));
        }
    }
    Ok(())
}

/// Verifies the currency exists and the account and category belong to `user_id`.
async fn check_references<C>(
    db: &C,
    user_id: &str,
    account_id: i64,
    category_id: Option<i64>,
    currency_code: &str,
) -> Result<()>
where
    C: ConnectionTrait,
{
    crate::core::currency::require_currency(db, currency_code).await?;
    crate::core::account::get_account_for_user(db, account_id, user_id).await?;
    if let Some(category_id) = category_id {
        crate::core::category::get_category_for_user(db, category_id, user_id).await?;
    }
    Ok(())
}

pub(crate) fn invalid_state(
    schedule: &scheduled_transaction::Model,
    operation: &'static str,
) -> Error {
    Error::InvalidState {
        id: schedule.id,
        status: schedule.status.to_string(),
        operation,
    }
}

/// Creates a new `PENDING` schedule for `user_id`.
///
/// # Errors
/// * `Validation` - non-positive amount, empty description, negative reminder days,
///   recurring without frequency, or end date before due date
/// * `NotFound` - unknown currency, or account/category not owned by the user
#[instrument(skip(db, args), fields(account_id = args.account_id))]
pub async fn create_schedule(
    db: &DatabaseConnection,
    user_id: &str,
    args: CreateScheduleArgs,
) -> Result<scheduled_transaction::Model> {
    validate_fields(&ScheduleFields {
        amount: args.amount,
        description: &args.description,
        due_date: args.due_date,
        is_recurring: args.is_recurring,
        frequency: args.frequency,
        end_date: args.end_date,
        reminder_days: args.reminder_days,
    })?;
    check_references(
        db,
        user_id,
        args.account_id,
        args.category_id,
        &args.currency_code,
    )
    .await?;

    let now = Utc::now();
    let schedule = scheduled_transaction::ActiveModel {
        id: NotSet,
        user_id: Set(user_id.to_string()),
        account_id: Set(args.account_id),
        category_id: Set(args.category_id),
        amount: Set(args.amount),
        currency_code: Set(args.currency_code),
        transaction_type: Set(args.transaction_type),
        description: Set(args.description.trim().to_string()),
        notes: Set(args.notes),
        due_date: Set(args.due_date),
        frequency: Set(args.frequency),
        end_date: Set(args.end_date),
        is_recurring: Set(args.is_recurring),
        status: Set(ScheduleStatus::Pending),
        completed_at: Set(None),
        reminder_days: Set(args.reminder_days),
        is_reminder_sent: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(schedule_id = schedule.id, "Created scheduled transaction");
    Ok(schedule)
}

/// Finds a schedule owned by `user_id`.
pub async fn get_schedule<C>(
    db: &C,
    schedule_id: i64,
    user_id: &str,
) -> Result<scheduled_transaction::Model>
where
    C: ConnectionTrait,
{
    ScheduledTransaction::find_by_id(schedule_id)
        .filter(scheduled_transaction::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Scheduled transaction", schedule_id))
}

/// Applies a partial update to an open schedule.
///
/// The merged record must satisfy the same invariants as a new one. Moving the
/// due date or changing the status re-arms the reminder.
///
/// # Errors
/// * `InvalidState` - the schedule is `COMPLETED` or `CANCELLED`
/// * `Validation` / `NotFound` - as for [`create_schedule`]
#[instrument(skip(db, args))]
pub async fn update_schedule(
    db: &DatabaseConnection,
    schedule_id: i64,
    user_id: &str,
    args: UpdateScheduleArgs,
) -> Result<scheduled_transaction::Model> {
    let existing = get_schedule(db, schedule_id, user_id).await?;
    if !existing.status.is_open() {
        return Err(invalid_state(&existing, "update"));
    }
    if let Some(status) = args.status {
        if !status.is_open() {
            return Err(Error::validation(format!(
                "Status can only be set to PENDING or OVERDUE, not {status}"
            )));
        }
    }

    let amount = args.amount.unwrap_or(existing.amount);
    let description = args
        .description
        .as_deref()
        .map_or_else(|| existing.description.clone(), |d| d.trim().to_string());
    let due_date = args.due_date.unwrap_or(existing.due_date);
    let is_recurring = args.is_recurring.unwrap_or(existing.is_recurring);
    let frequency = args.frequency.unwrap_or(existing.frequency);
    let end_date = args.end_date.unwrap_or(existing.end_date);
    let reminder_days = args.reminder_days.unwrap_or(existing.reminder_days);
    validate_fields(&ScheduleFields {
        amount,
        description: &description,
        due_date,
        is_recurring,
        frequency,
        end_date,
        reminder_days,
    })?;

    let account_id = args.account_id.unwrap_or(existing.account_id);
    let category_id = args.category_id.unwrap_or(existing.category_id);
    let currency_code = args
        .currency_code
        .unwrap_or_else(|| existing.currency_code.clone());
    check_references(db, user_id, account_id, category_id, &currency_code).await?;

    let status = args.status.unwrap_or(existing.status);
    let rearm_reminder = due_date != existing.due_date || status != existing.status;

    let mut active: scheduled_transaction::ActiveModel = existing.clone().into();
    active.account_id = Set(account_id);
    active.category_id = Set(category_id);
    active.amount = Set(amount);
    active.currency_code = Set(currency_code);
    if let Some(transaction_type) = args.transaction_type {
        active.transaction_type = Set(transaction_type);
    }
    active.description = Set(description);
    if let Some(notes) = args.notes {
        active.notes = Set(notes);
    }
    active.due_date = Set(due_date);
    active.is_recurring = Set(is_recurring);
    active.frequency = Set(frequency);
    active.end_date = Set(end_date);
    active.reminder_days = Set(reminder_days);
    active.status = Set(status);
    if rearm_reminder {
        active.is_reminder_sent = Set(false);
    }
    active.updated_at = Set(Utc::now());

    // The status guard catches an execution or cancellation that committed after
    // the read above.
    let updated = ScheduledTransaction::update(active)
        .filter(scheduled_transaction::Column::Status.is_in(OPEN_STATUSES))
        .exec(db)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated => Error::InvalidState {
                id: schedule_id,
                status: "terminal".to_string(),
                operation: "update",
            },
            other => other.into(),
        })?;

    debug!(schedule_id, "Updated scheduled transaction");
    Ok(updated)
}

/// Lists the user's schedules, most urgent first.
///
/// Runs the overdue sweep for the user before querying so that `OVERDUE` filters
/// see up-to-date statuses.
#[instrument(skip(db, filter))]
pub async fn list_schedules(
    db: &DatabaseConnection,
    user_id: &str,
    filter: &ScheduleFilter,
    pagination: Pagination,
    now: DateTime<Utc>,
) -> Result<Paginated<scheduled_transaction::Model>> {
    crate::core::sweep::sweep_overdue(
        db,
        &crate::core::sweep::SweepScope::User(user_id.to_string()),
        now,
    )
    .await?;

    let mut query =
        ScheduledTransaction::find().filter(scheduled_transaction::Column::UserId.eq(user_id));
    if let Some(status) = filter.status {
        query = query.filter(scheduled_transaction::Column::Status.eq(status));
    }
    if let Some(transaction_type) = filter.transaction_type {
        query = query.filter(scheduled_transaction::Column::TransactionType.eq(transaction_type));
    }
    if let Some(account_id) = filter.account_id {
        query = query.filter(scheduled_transaction::Column::AccountId.eq(account_id));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(scheduled_transaction::Column::CategoryId.eq(category_id));
    }
    if let Some(is_recurring) = filter.is_recurring {
        query = query.filter(scheduled_transaction::Column::IsRecurring.eq(is_recurring));
    }
    if let Some(due_from) = filter.due_from {
        query = query.filter(scheduled_transaction::Column::DueDate.gte(due_from));
    }
    if let Some(due_to) = filter.due_to {
        query = query.filter(scheduled_transaction::Column::DueDate.lte(due_to));
    }

    let page = pagination.page.max(1);
    let limit = pagination.limit.clamp(1, MAX_PAGE_SIZE);
    let paginator = query
        .order_by_asc(scheduled_transaction::Column::Status)
        .order_by_asc(scheduled_transaction::Column::DueDate)
        .order_by_asc(scheduled_transaction::Column::Id)
        .paginate(db, limit);

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    Ok(Paginated {
        items,
        total,
        page,
        limit,
    })
}

/// Cancels an open schedule.
///
/// # Errors
/// * `InvalidState` - the schedule is already `COMPLETED` or `CANCELLED`
#[instrument(skip(db))]
pub async fn cancel_schedule(
    db: &DatabaseConnection,
    schedule_id: i64,
    user_id: &str,
) -> Result<scheduled_transaction::Model> {
    let existing = get_schedule(db, schedule_id, user_id).await?;
    if !existing.status.is_open() {
        return Err(invalid_state(&existing, "cancel"));
    }

    let result = ScheduledTransaction::update_many()
        .col_expr(
            scheduled_transaction::Column::Status,
            Expr::value(ScheduleStatus::Cancelled),
        )
        .col_expr(
            scheduled_transaction::Column::IsReminderSent,
            Expr::value(false),
        )
        .col_expr(
            scheduled_transaction::Column::UpdatedAt,
            Expr::value(Utc::now()),
        )
        .filter(scheduled_transaction::Column::Id.eq(schedule_id))
        .filter(scheduled_transaction::Column::Status.is_in(OPEN_STATUSES))
        .exec(db)
        .await?;

    let cancelled = get_schedule(db, schedule_id, user_id).await?;
    if result.rows_affected == 0 {
        return Err(invalid_state(&cancelled, "cancel"));
    }

    info!(schedule_id, "Cancelled scheduled transaction");
    Ok(cancelled)
}

/// Permanently deletes a schedule regardless of its status.
#[instrument(skip(db))]
pub async fn delete_schedule(db: &DatabaseConnection, schedule_id: i64, user_id: &str) -> Result<()> {
    let existing = get_schedule(db, schedule_id, user_id).await?;
    existing.delete(db).await?;

    info!(schedule_id, "Deleted scheduled transaction");
    Ok(())
}
