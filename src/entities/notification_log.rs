//! Notification log entity - One row per successfully dispatched notification.
//!
//! Used to avoid notifying the same overdue schedule more than once per calendar day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which notification flow produced a log entry
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// Upcoming due date inside the reminder window
    #[sea_orm(string_value = "REMINDER")]
    Reminder,
    /// Due date has passed without execution
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
}

/// Notification log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Scheduled transaction the notification was about
    pub schedule_id: i64,
    pub kind: NotificationKind,
    /// When the dispatcher reported success
    pub sent_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scheduled_transaction::Entity",
        from = "Column::ScheduleId",
        to = "super::scheduled_transaction::Column::Id",
        on_delete = "Cascade"
    )]
    ScheduledTransaction,
}

impl Related<super::scheduled_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduledTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
