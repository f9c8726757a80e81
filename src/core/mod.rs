//! Core business logic - framework-agnostic scheduling, execution and reminder
//! operations. Every function takes an explicit database handle and, where
//! ownership matters, the calling user's id.

/// Account lookups and creation
pub mod account;
/// Category lookups and creation
pub mod category;
/// Currency reference data
pub mod currency;
/// Execution of a due scheduled transaction
pub mod execution;
/// Balance mutation through atomic increments
pub mod ledger;
/// Next-due-date arithmetic
pub mod recurrence;
/// Reminder and overdue notification selection and dispatch
pub mod reminder;
/// Scheduled transaction CRUD and listing
pub mod schedule;
/// PENDING to OVERDUE status sweep
pub mod sweep;
/// Realized transaction entry and removal
pub mod transaction;
