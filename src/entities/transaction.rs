//! Transaction entity - A realized ledger entry.
//!
//! Transactions are either entered manually or produced by executing a scheduled
//! transaction. Amounts are always positive; the effect on the account balance is
//! derived from `transaction_type` (see [`crate::core::ledger::signed_amount`]).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a transaction's effect on its account
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money coming into the account
    #[sea_orm(string_value = "INCOME")]
    Income,
    /// Money leaving the account
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
    /// Money moved out of the account to somewhere else
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        };
        f.write_str(s)
    }
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the transaction
    pub user_id: String,
    /// Account whose balance this transaction moved
    pub account_id: i64,
    /// Optional category
    pub category_id: Option<i64>,
    /// Always positive; sign comes from `transaction_type`
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub currency_code: String,
    pub transaction_type: TransactionType,
    /// Human-readable description; executed schedules reference their origin here
    pub description: String,
    pub notes: Option<String>,
    /// Effective date of the transaction
    pub date: DateTimeUtc,
    /// When the row was inserted
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
