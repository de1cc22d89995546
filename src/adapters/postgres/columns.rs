//! Column decoding helpers shared by the PostgreSQL adapters.

use std::str::FromStr;

use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Reads a column, turning decode failures into `DatabaseError`.
pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(&format!("Could not read column '{}'", name), e))
}

/// Parses a text column into a domain enum.
pub(crate) fn parse_column<T>(value: &str, name: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = ValidationError>,
{
    value.parse::<T>().map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid value in column '{}': {}", name, e),
        )
    })
}

/// True when the error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
