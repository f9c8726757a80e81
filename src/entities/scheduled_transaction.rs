//! Scheduled transaction entity - A future (optionally recurring) financial obligation.
//!
//! A schedule starts out `PENDING`, may be swept to `OVERDUE` once its due date has
//! passed, and ends either `COMPLETED` (executed) or `CANCELLED`. The status column
//! stores an urgency rank so that sorting by status puts open items first.

use crate::errors::Error;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::transaction::TransactionType;

/// Lifecycle status of a scheduled transaction.
///
/// The numeric value is the sort rank used by listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    #[sea_orm(num_value = 0)]
    Pending,
    #[sea_orm(num_value = 1)]
    Overdue,
    #[sea_orm(num_value = 2)]
    Completed,
    #[sea_orm(num_value = 3)]
    Cancelled,
}

impl ScheduleStatus {
    /// Open schedules can still be edited, executed or cancelled.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Overdue)
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Overdue => "OVERDUE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// How often a recurring schedule repeats
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    #[sea_orm(string_value = "DAILY")]
    Daily,
    #[sea_orm(string_value = "WEEKLY")]
    Weekly,
    #[sea_orm(string_value = "MONTHLY")]
    Monthly,
    #[sea_orm(string_value = "YEARLY")]
    Yearly,
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            _ => Err(Error::UnsupportedFrequency {
                value: s.to_string(),
            }),
        }
    }
}

/// Scheduled transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scheduled_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the schedule
    pub user_id: String,
    /// Account whose balance changes on execution
    pub account_id: i64,
    pub category_id: Option<i64>,
    /// Always positive; sign comes from `transaction_type` at execution time
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub currency_code: String,
    pub transaction_type: TransactionType,
    pub description: String,
    pub notes: Option<String>,
    /// When the obligation is due
    pub due_date: DateTimeUtc,
    /// Required when `is_recurring` is true
    pub frequency: Option<Frequency>,
    /// Last date a successor may be due on (inclusive)
    pub end_date: Option<DateTimeUtc>,
    pub is_recurring: bool,
    pub status: ScheduleStatus,
    /// Set only on the transition to `COMPLETED`
    pub completed_at: Option<DateTimeUtc>,
    /// Lead time in days before `due_date` at which a reminder becomes due
    pub reminder_days: i32,
    pub is_reminder_sent: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `ScheduledTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each schedule belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    /// Optional category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    /// Notifications sent about this schedule
    #[sea_orm(has_many = "super::notification_log::Entity")]
    NotificationLogs,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::notification_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NotificationLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
