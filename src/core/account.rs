//! Account lookups.
//!
//! Account management lives outside the scheduling engine; these helpers cover
//! the owner-scoped lookups the engine needs and account creation for seeding.

use crate::{
    entities::{Account, account},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{Set, prelude::*};

/// Creates an account with an opening balance.
pub async fn create_account(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    currency_code: &str,
    opening_balance: Decimal,
) -> Result<account::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Account name cannot be empty"));
    }
    crate::core::currency::require_currency(db, currency_code).await?;

    let account = account::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.trim().to_string()),
        currency_code: Set(currency_code.to_string()),
        balance: Set(opening_balance),
        ..Default::default()
    };

    account.insert(db).await.map_err(Into::into)
}

/// Finds an account owned by `user_id`.
///
/// Accounts of other users are reported exactly like missing ones.
pub async fn get_account_for_user<C>(db: &C, account_id: i64, user_id: &str) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .filter(account::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Account", account_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_get_account_for_user_is_owner_scoped() -> Result<()> {
        let (db, account) = setup_with_account().await?;

        let found = get_account_for_user(&db, account.id, TEST_USER).await?;
        assert_eq!(found, account);

        let result = get_account_for_user(&db, account.id, "someone_else").await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Account", .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_account_rejects_unknown_currency() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_account(&db, TEST_USER, "Wallet", "XXX", Decimal::ZERO).await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Currency", .. })));

        let result = create_account(&db, TEST_USER, "  ", "JPY", Decimal::ZERO).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }
}
