//! Account entity - A bank, cash or card account held in a single currency.
//!
//! The only field the scheduling engine ever writes is `balance`, and only through
//! an SQL-level increment in [`crate::core::ledger`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the account
    pub user_id: String,
    /// Display name (e.g., "Main checking", "Wallet")
    pub name: String,
    /// ISO 4217 code of the account's currency
    pub currency_code: String,
    /// Current balance
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub balance: Decimal,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many realized transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One account has many scheduled transactions
    #[sea_orm(has_many = "super::scheduled_transaction::Entity")]
    ScheduledTransactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::scheduled_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduledTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
