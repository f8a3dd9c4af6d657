//! Shared Diesel error mapping for the campground repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let (PoolError::Checkout(message) | PoolError::Build(message)) = error;
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Messages from the database are logged at debug level and replaced by a
/// fixed label, so driver text never reaches the domain.
pub(crate) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::BrokenTransactionManager => connection("database transaction manager broken"),
        _ => query("database error"),
    }
}

/// Column named by a unique-constraint violation, if `error` is one.
///
/// Relies on the `<table>_<column>_key` constraint names used by the
/// migrations.
pub(crate) fn unique_violation_column(error: &DieselError) -> Option<String> {
    let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = error else {
        return None;
    };
    let constraint = info.constraint_name()?;
    let column = constraint
        .split_once('_')
        .map_or(constraint, |(_, rest)| rest)
        .trim_end_matches("_key");
    Some(column.to_owned())
}
