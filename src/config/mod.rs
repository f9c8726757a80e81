/// Database configuration and connection management
pub mod database;

/// Scheduler settings and currency seed list loaded from scheduler.toml
pub mod scheduler;
