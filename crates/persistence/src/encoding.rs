// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Text encodings for values `SQLite` has no native type for.
//!
//! Timestamps are stored as fixed-width UTC strings so that lexical
//! ordering in SQL matches chronological ordering. Money is stored as the
//! decimal's canonical string so no precision is lost to floating point.

use rust_decimal::Decimal;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::PersistenceError;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Encodes a timestamp as a fixed-width UTC string.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn encode_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("timestamp: {e}")))
}

/// Decodes a timestamp written by [`encode_timestamp`].
///
/// # Errors
///
/// Returns `PersistenceError::CorruptRecord` if the text is malformed.
pub fn decode_timestamp(table: &'static str, value: &str) -> Result<OffsetDateTime, PersistenceError> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| PersistenceError::CorruptRecord {
            table,
            reason: format!("timestamp '{value}': {e}"),
        })
}

/// Encodes a calendar date as `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns an error if the date cannot be formatted.
pub fn encode_date(value: Date) -> Result<String, PersistenceError> {
    value
        .format(DATE_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("date: {e}")))
}

/// Decodes a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns `PersistenceError::CorruptRecord` if the text is malformed.
pub fn decode_date(table: &'static str, value: &str) -> Result<Date, PersistenceError> {
    Date::parse(value, DATE_FORMAT).map_err(|e| PersistenceError::CorruptRecord {
        table,
        reason: format!("date '{value}': {e}"),
    })
}

/// Encodes a decimal amount.
#[must_use]
pub fn encode_decimal(value: Decimal) -> String {
    value.to_string()
}

/// Decodes a decimal amount.
///
/// # Errors
///
/// Returns `PersistenceError::CorruptRecord` if the text is not a decimal.
pub fn decode_decimal(table: &'static str, value: &str) -> Result<Decimal, PersistenceError> {
    value
        .parse::<Decimal>()
        .map_err(|e| PersistenceError::CorruptRecord {
            table,
            reason: format!("amount '{value}': {e}"),
        })
}
