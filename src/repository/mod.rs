//! Repository functions: one function per database operation.
//!
//! Every function takes the shared pool (or an open transaction) and returns
//! `Result<T, AppError>`. Multi-row workflow steps run inside a single SQL
//! transaction so a failed write never leaves a purchase half-recorded.

pub mod blog;
pub mod contact;
pub mod events;
pub mod installments;
pub mod products;
pub mod transactions;
pub mod users;

/// Postgres reported a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
