//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod account;
pub mod category;
pub mod currency;
pub mod notification_log;
pub mod scheduled_transaction;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use currency::{Column as CurrencyColumn, Entity as Currency, Model as CurrencyModel};
pub use notification_log::{
    Column as NotificationLogColumn, Entity as NotificationLog, Model as NotificationLogModel,
    NotificationKind,
};
pub use scheduled_transaction::{
    Column as ScheduledTransactionColumn, Entity as ScheduledTransaction, Frequency,
    Model as ScheduledTransactionModel, ScheduleStatus,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionType,
};
