//! Reminder and overdue notification selection.
//!
//! Two scans feed the external notification channel:
//!
//! * upcoming reminders: `PENDING` schedules due between the start of today and the
//!   look-ahead horizon whose own `reminder_days` lead time has been reached, and
//!   that have not been reminded yet
//! * overdue notices: `OVERDUE` schedules that fell due inside a recent window and
//!   have not been notified today
//!
//! Delivery itself belongs to a [`NotificationDispatcher`]. A schedule is only
//! marked as reminded after its dispatcher reports success, so failed deliveries
//! are retried by the next scan.

use crate::{
    entities::{
        Account, Category, NotificationKind, NotificationLog, ScheduleStatus, ScheduledTransaction,
        TransactionType, notification_log, scheduled_transaction,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use tracing::{info, instrument, warn};

/// Everything a notification channel needs to describe a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderNotice {
    pub schedule_id: i64,
    pub user_id: String,
    pub amount: Decimal,
    pub currency_code: String,
    pub transaction_type: TransactionType,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub account_name: String,
    pub category_name: Option<String>,
    pub notes: Option<String>,
}

/// Delivers notices to users (webhooks, chat, e-mail...).
pub trait NotificationDispatcher {
    /// Sends one notice. An `Err` leaves the schedule eligible for the next scan.
    fn dispatch(
        &self,
        kind: NotificationKind,
        notice: &ReminderNotice,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Dispatcher that only writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, kind: NotificationKind, notice: &ReminderNotice) -> Result<()> {
        info!(
            ?kind,
            schedule_id = notice.schedule_id,
            user_id = %notice.user_id,
            amount = %notice.amount,
            currency = %notice.currency_code,
            due_date = %notice.due_date,
            account = %notice.account_name,
            "{}",
            notice.description
        );
        Ok(())
    }
}

/// Counts from one dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn days(count: i64) -> Result<TimeDelta> {
    TimeDelta::try_days(count).ok_or_else(|| Error::DateOutOfRange {
        message: format!("{count} days is out of range"),
    })
}

/// Attaches account and category names to schedules.
async fn to_notices(
    db: &DatabaseConnection,
    schedules: Vec<scheduled_transaction::Model>,
) -> Result<Vec<ReminderNotice>> {
    let account_ids: HashSet<i64> = schedules.iter().map(|s| s.account_id).collect();
    let category_ids: HashSet<i64> = schedules.iter().filter_map(|s| s.category_id).collect();

    let account_names: HashMap<i64, String> = Account::find()
        .filter(crate::entities::account::Column::Id.is_in(account_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let category_names: HashMap<i64, String> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        Category::find()
            .filter(crate::entities::category::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect()
    };

    Ok(schedules
        .into_iter()
        .map(|s| ReminderNotice {
            schedule_id: s.id,
            account_name: account_names.get(&s.account_id).cloned().unwrap_or_default(),
            category_name: s.category_id.and_then(|id| category_names.get(&id).cloned()),
            user_id: s.user_id,
            amount: s.amount,
            currency_code: s.currency_code,
            transaction_type: s.transaction_type,
            description: s.description,
            due_date: s.due_date,
            notes: s.notes,
        })
        .collect())
}

/// Finds schedules whose reminder is due at `now`.
///
/// A schedule qualifies when it is `PENDING`, not yet reminded, due no earlier than
/// the start of today and no later than `now + lookahead_days`, and
/// `now >= due_date - reminder_days`. The look-ahead bound and the per-schedule
/// lead time are checked independently.
#[instrument(skip(db))]
pub async fn pending_reminders(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
    lookahead_days: i64,
) -> Result<Vec<ReminderNotice>> {
    let horizon = now
        .checked_add_signed(days(lookahead_days)?)
        .ok_or_else(|| Error::DateOutOfRange {
            message: format!("look-ahead of {lookahead_days} days from {now}"),
        })?;

    let candidates = ScheduledTransaction::find()
        .filter(scheduled_transaction::Column::Status.eq(ScheduleStatus::Pending))
        .filter(scheduled_transaction::Column::IsReminderSent.eq(false))
        .filter(scheduled_transaction::Column::DueDate.gte(start_of_day(now)))
        .filter(scheduled_transaction::Column::DueDate.lte(horizon))
        .order_by_asc(scheduled_transaction::Column::DueDate)
        .order_by_asc(scheduled_transaction::Column::Id)
        .all(db)
        .await?;

    let mut due = Vec::with_capacity(candidates.len());
    for schedule in candidates {
        // A lead time reaching past the calendar range is already reached
        let lead_reached = schedule
            .due_date
            .checked_sub_signed(days(i64::from(schedule.reminder_days))?)
            .is_none_or(|remind_from| now >= remind_from);
        if lead_reached {
            due.push(schedule);
        }
    }

    to_notices(db, due).await
}

/// Marks a schedule as reminded. Call only after a successful dispatch.
pub async fn mark_reminded(db: &DatabaseConnection, schedule_id: i64) -> Result<()> {
    let result = ScheduledTransaction::update_many()
        .col_expr(
            scheduled_transaction::Column::IsReminderSent,
            Expr::value(true),
        )
        .filter(scheduled_transaction::Column::Id.eq(schedule_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("Scheduled transaction", schedule_id));
    }
    Ok(())
}

/// Records a successful delivery in the notification log.
pub async fn record_notification(
    db: &DatabaseConnection,
    schedule_id: i64,
    kind: NotificationKind,
    sent_at: DateTime<Utc>,
) -> Result<notification_log::Model> {
    notification_log::ActiveModel {
        schedule_id: Set(schedule_id),
        kind: Set(kind),
        sent_at: Set(sent_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds `OVERDUE` schedules due in `[since, now)` that have not had an overdue
/// notice on `now`'s calendar day.
#[instrument(skip(db))]
pub async fn overdue_needing_notification(
    db: &DatabaseConnection,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Vec<ReminderNotice>> {
    let today = start_of_day(now);
    let tomorrow = today + days(1)?;

    let notified_today: HashSet<i64> = NotificationLog::find()
        .filter(notification_log::Column::Kind.eq(NotificationKind::Overdue))
        .filter(notification_log::Column::SentAt.gte(today))
        .filter(notification_log::Column::SentAt.lt(tomorrow))
        .all(db)
        .await?
        .into_iter()
        .map(|log| log.schedule_id)
        .collect();

    let overdue: Vec<scheduled_transaction::Model> = ScheduledTransaction::find()
        .filter(scheduled_transaction::Column::Status.eq(ScheduleStatus::Overdue))
        .filter(scheduled_transaction::Column::DueDate.gte(since))
        .filter(scheduled_transaction::Column::DueDate.lt(now))
        .order_by_asc(scheduled_transaction::Column::DueDate)
        .order_by_asc(scheduled_transaction::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .filter(|s| !notified_today.contains(&s.id))
        .collect();

    to_notices(db, overdue).await
}

/// Sends every due reminder and marks the delivered ones.
#[instrument(skip(db, dispatcher))]
pub async fn dispatch_reminders<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    now: DateTime<Utc>,
    lookahead_days: i64,
) -> Result<DispatchReport>
where
    D: NotificationDispatcher,
{
    let mut report = DispatchReport::default();
    for notice in pending_reminders(db, now, lookahead_days).await? {
        match dispatcher.dispatch(NotificationKind::Reminder, &notice).await {
            Ok(()) => {
                mark_reminded(db, notice.schedule_id).await?;
                record_notification(db, notice.schedule_id, NotificationKind::Reminder, now)
                    .await?;
                report.sent += 1;
            }
            Err(e) => {
                warn!(schedule_id = notice.schedule_id, "Reminder dispatch failed: {}", e);
                report.failed += 1;
            }
        }
    }

    info!(sent = report.sent, failed = report.failed, "Reminder run finished");
    Ok(report)
}

/// Sends an overdue notice for every schedule that has not had one today.
#[instrument(skip(db, dispatcher))]
pub async fn dispatch_overdue_notifications<D>(
    db: &DatabaseConnection,
    dispatcher: &D,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<DispatchReport>
where
    D: NotificationDispatcher,
{
    let mut report = DispatchReport::default();
    for notice in overdue_needing_notification(db, since, now).await? {
        match dispatcher.dispatch(NotificationKind::Overdue, &notice).await {
            Ok(()) => {
                record_notification(db, notice.schedule_id, NotificationKind::Overdue, now)
                    .await?;
                report.sent += 1;
            }
            Err(e) => {
                warn!(schedule_id = notice.schedule_id, "Overdue dispatch failed: {}", e);
                report.failed += 1;
            }
        }
    }

    info!(sent = report.sent, failed = report.failed, "Overdue run finished");
    Ok(report)
}
