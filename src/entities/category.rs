//! Category entity - User-defined grouping for transactions (e.g., "Rent", "Salary").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::scheduled_transaction::Entity")]
    ScheduledTransactions,
}

impl Related<super::scheduled_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduledTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
