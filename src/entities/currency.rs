//! Currency entity - Reference table of supported currencies, keyed by ISO code.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Currency database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    /// ISO 4217 code (e.g., `"JPY"`, `"USD"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    /// Human-readable name (e.g., "Japanese Yen")
    pub name: String,
    /// Display symbol (e.g., "¥")
    pub symbol: String,
}

/// `Currency` is looked up by code only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
