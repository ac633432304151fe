//! Database layer (SQLite via sqlx).

pub mod accounts;

pub use accounts::AccountStore;
