//! Realized transaction business logic.
//!
//! A realized transaction is a ledger entry that has actually happened. It is
//! either entered directly or produced by executing a schedule. Creating or
//! deleting one moves the account balance through [`crate::core::ledger`] inside
//! the same database transaction, so the entry and its balance effect always
//! commit together.

use crate::{
    core::ledger,
    entities::{Transaction, TransactionType, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Input for [`create_transaction`].
#[derive(Debug, Clone)]
pub struct CreateTransactionArgs {
    pub account_id: i64,
    pub category_id: Option<i64>,
    /// Must be strictly positive
    pub amount: Decimal,
    pub currency_code: String,
    pub transaction_type: TransactionType,
    pub description: String,
    pub notes: Option<String>,
    /// Effective date of the transaction
    pub date: DateTime<Utc>,
}

/// Inserts a transaction row without touching any balance.
///
/// Callers are responsible for applying the balance delta in the same
/// database transaction.
pub(crate) async fn insert_transaction<C>(
    db: &C,
    user_id: &str,
    args: &CreateTransactionArgs,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    transaction::ActiveModel {
        user_id: Set(user_id.to_string()),
        account_id: Set(args.account_id),
        category_id: Set(args.category_id),
        amount: Set(args.amount),
        currency_code: Set(args.currency_code.clone()),
        transaction_type: Set(args.transaction_type),
        description: Set(args.description.clone()),
        notes: Set(args.notes.clone()),
        date: Set(args.date),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Records a transaction and applies its signed amount to the account balance.
///
/// # Errors
/// * `Validation` - non-positive amount or empty description
/// * `NotFound` - unknown currency, or account/category not owned by the user
#[instrument(skip(db, args), fields(account_id = args.account_id))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    args: CreateTransactionArgs,
) -> Result<transaction::Model> {
    if args.amount <= Decimal::ZERO {
        return Err(Error::validation(format!(
            "Amount must be greater than zero, got {}",
            args.amount
        )));
    }
    if args.description.trim().is_empty() {
        return Err(Error::validation("Description cannot be empty"));
    }

    // Use a transaction to ensure atomicity
    let txn = db.begin().await?;

    crate::core::currency::require_currency(&txn, &args.currency_code).await?;
    crate::core::account::get_account_for_user(&txn, args.account_id, user_id).await?;
    if let Some(category_id) = args.category_id {
        crate::core::category::get_category_for_user(&txn, category_id, user_id).await?;
    }

    let created = insert_transaction(&txn, user_id, &args).await?;
    ledger::apply_delta(
        &txn,
        created.account_id,
        ledger::signed_amount(created.transaction_type, created.amount),
    )
    .await?;

    txn.commit().await?;

    info!(transaction_id = created.id, "Recorded transaction");
    Ok(created)
}

/// Finds a transaction owned by `user_id`.
pub async fn get_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    user_id: &str,
) -> Result<transaction::Model> {
    Transaction::find_by_id(transaction_id)
        .filter(transaction::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Transaction", transaction_id))
}

/// Retrieves all of the user's transactions on an account, newest first.
pub async fn get_transactions_for_account(
    db: &DatabaseConnection,
    account_id: i64,
    user_id: &str,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::AccountId.eq(account_id))
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a transaction and reverses its effect on the account balance.
#[instrument(skip(db))]
pub async fn delete_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    user_id: &str,
) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Transaction::find_by_id(transaction_id)
        .filter(transaction::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Transaction", transaction_id))?;

    let account_id = existing.account_id;
    let reversal = -ledger::signed_amount(existing.transaction_type, existing.amount);

    existing.delete(&txn).await?;
    ledger::apply_delta(&txn, account_id, reversal).await?;

    txn.commit().await?;

    info!(transaction_id, "Deleted transaction");
    Ok(())
}
