//! Balance ledger - the single place where account balances change.
//!
//! Balances are never read, modified and written back by the application. Every
//! change is a single SQL statement:
//! `UPDATE accounts SET balance = ROUND(balance + ?, 4) WHERE id = ?`
//! so concurrent writers cannot lose each other's updates. Callers pass the open
//! database transaction so the increment commits or rolls back with the rest of
//! their work.
//!
//! `SQLite` stores decimal columns with REAL affinity, so the addition itself is
//! floating point. Rounding back to [`BALANCE_SCALE`] places after every increment
//! keeps repeated fractional deltas from drifting.

use crate::{
    entities::{Account, TransactionType, account},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{
    prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use tracing::debug;

/// Decimal places kept on stored balances; matches the money columns' scale.
pub const BALANCE_SCALE: i32 = 4;

/// Returns the balance effect of a transaction of `transaction_type` for `amount`.
///
/// EXPENSE and TRANSFER take money out of the account; INCOME puts it in.
/// Scheduled transfers carry no destination account, so only the source leg is booked.
#[must_use]
pub fn signed_amount(transaction_type: TransactionType, amount: Decimal) -> Decimal {
    match transaction_type {
        TransactionType::Income => amount,
        TransactionType::Expense | TransactionType::Transfer => -amount,
    }
}

/// Atomically adds `delta` to the balance of `account_id` and returns the updated account.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `account_id` - Account to update
/// * `delta` - Signed amount to add (negative to subtract)
pub async fn apply_delta<C>(db: &C, account_id: i64, delta: Decimal) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    // First verify the account exists
    Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Account", account_id))?;

    // balance = ROUND(balance + delta, scale)
    Account::update_many()
        .col_expr(
            account::Column::Balance,
            SimpleExpr::from(Func::round_with_precision(
                Expr::col(account::Column::Balance).add(delta),
                BALANCE_SCALE,
            )),
        )
        .filter(account::Column::Id.eq(account_id))
        .exec(db)
        .await?;

    debug!(account_id, %delta, "Applied balance delta");

    Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Account", account_id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::TransactionTrait;

    #[test]
    fn test_signed_amount_rules() {
        let amount = Decimal::new(2550, 2);
        assert_eq!(signed_amount(TransactionType::Income, amount), amount);
        assert_eq!(signed_amount(TransactionType::Expense, amount), -amount);
        assert_eq!(signed_amount(TransactionType::Transfer, amount), -amount);
    }

    #[tokio::test]
    async fn test_apply_delta_increments_balance() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        let updated = apply_delta(&db, account.id, Decimal::from(250)).await?;
        assert_eq!(updated.balance, Decimal::from(1250));

        let updated = apply_delta(&db, account.id, Decimal::from(-1500)).await?;
        assert_eq!(updated.balance, Decimal::from(-250));

        Ok(())
    }

    #[tokio::test]
    async fn test_fractional_deltas_do_not_drift() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        for _ in 0..1000 {
            apply_delta(&db, account.id, Decimal::new(1, 1)).await?;
        }
        for _ in 0..30 {
            apply_delta(&db, account.id, Decimal::new(-333, 4)).await?;
        }

        let reloaded = Account::find_by_id(account.id).one(&db).await?.unwrap();
        // 1000 + 1000 * 0.1 - 30 * 0.0333
        assert_eq!(reloaded.balance, Decimal::new(1_099_001, 3));

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_delta_missing_account() -> Result<()> {
        let db = setup_test_db().await?;

        let result = apply_delta(&db, 999, Decimal::ONE).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_delta_rolls_back_with_transaction() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        let txn = db.begin().await?;
        apply_delta(&txn, account.id, Decimal::from(500)).await?;
        txn.rollback().await?;

        let reloaded = Account::find_by_id(account.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.balance, Decimal::from(1000));

        Ok(())
    }
}
