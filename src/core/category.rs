//! Category lookups.

use crate::{
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Creates a category for `user_id`.
pub async fn create_category(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<category::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("Category name cannot be empty"));
    }

    category::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a category owned by `user_id`, treating other users' categories as missing.
pub async fn get_category_for_user<C>(
    db: &C,
    category_id: i64,
    user_id: &str,
) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(category::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Category", category_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_category_owner_scoping() -> Result<()> {
        let db = setup_test_db().await?;
        let rent = create_category(&db, TEST_USER, "Rent").await?;

        assert_eq!(get_category_for_user(&db, rent.id, TEST_USER).await?.name, "Rent");

        let result = get_category_for_user(&db, rent.id, "intruder").await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        Ok(())
    }
}
