//! Currency reference data.
//!
//! Currencies are seeded from configuration and only ever read by the scheduling
//! engine, which rejects schedules whose currency code is unknown.

use crate::{
    config::scheduler::CurrencyConfig,
    entities::{Currency, currency},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Finds a currency by its ISO code.
pub async fn get_currency<C>(db: &C, code: &str) -> Result<Option<currency::Model>>
where
    C: ConnectionTrait,
{
    Currency::find_by_id(code.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_currency`], but a missing currency is an error.
pub async fn require_currency<C>(db: &C, code: &str) -> Result<currency::Model>
where
    C: ConnectionTrait,
{
    get_currency(db, code)
        .await?
        .ok_or_else(|| Error::not_found("Currency", code))
}

/// Inserts every configured currency that is not already present.
///
/// Existing rows are left untouched. Returns the number of currencies inserted.
pub async fn seed_currencies(db: &DatabaseConnection, currencies: &[CurrencyConfig]) -> Result<usize> {
    let mut inserted = 0;
    for config in currencies {
        let code = config.code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(Error::Config {
                message: "Currency code cannot be empty".to_string(),
            });
        }
        if get_currency(db, &code).await?.is_some() {
            continue;
        }

        currency::ActiveModel {
            code: Set(code),
            name: Set(config.name.clone()),
            symbol: Set(config.symbol.clone()),
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    info!("Seeded {} new currencies", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_seed_currencies_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let configs = vec![
            CurrencyConfig {
                code: "eur".to_string(),
                name: "Euro".to_string(),
                symbol: "€".to_string(),
            },
            CurrencyConfig {
                code: "JPY".to_string(),
                name: "Japanese Yen".to_string(),
                symbol: "¥".to_string(),
            },
        ];

        // setup_test_db already seeds JPY and USD
        assert_eq!(seed_currencies(&db, &configs).await?, 1);
        assert_eq!(seed_currencies(&db, &configs).await?, 0);

        let eur = get_currency(&db, "EUR").await?.unwrap();
        assert_eq!(eur.symbol, "€");

        Ok(())
    }

    #[tokio::test]
    async fn test_require_currency_missing() -> Result<()> {
        let db = setup_test_db().await?;

        let result = require_currency(&db, "XXX").await;
        assert!(matches!(result, Err(Error::NotFound { entity: "Currency", .. })));

        Ok(())
    }
}
