//! Column decoding helpers shared by the repositories.

use std::{error::Error as StdError, str::FromStr};

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

/// Reads a text column and parses it into a domain enum.
pub(crate) fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let value: String = row.try_get(col)?;

    value.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn try_get_timestamp(row: &PgRow, col: &str) -> Result<Timestamp, sqlx::Error> {
    Ok(row.try_get::<SqlxTimestamp, _>(col)?.to_jiff())
}

pub(crate) fn try_get_optional_timestamp(
    row: &PgRow,
    col: &str,
) -> Result<Option<Timestamp>, sqlx::Error> {
    Ok(row
        .try_get::<Option<SqlxTimestamp>, _>(col)?
        .map(SqlxTimestamp::to_jiff))
}

/// Reads an optional `(type, uuid)` column pair.
pub(crate) fn try_get_slot(
    row: &PgRow,
    type_col: &str,
    uuid_col: &str,
) -> Result<Option<(String, Uuid)>, sqlx::Error> {
    let kind: Option<String> = row.try_get(type_col)?;
    let uuid: Option<Uuid> = row.try_get(uuid_col)?;

    match (kind, uuid) {
        (Some(kind), Some(uuid)) => Ok(Some((kind, uuid))),
        (None, None) => Ok(None),
        _ => Err(sqlx::Error::ColumnDecode {
            index: type_col.to_string(),
            source: format!("`{type_col}` and `{uuid_col}` must be set together").into(),
        }),
    }
}

/// Error for a polymorphic type column holding an unexpected value.
pub(crate) fn unknown_slot_type(col: &str, value: &str) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: format!("unknown `{col}` value `{value}`").into(),
    }
}
