// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Input validation for service requests and offers.
//!
//! Validation collects every violated field instead of stopping at the
//! first one, so callers can report all problems in a single response.

use crate::error::{DomainError, FieldError};
use crate::types::{Location, NewServiceRequest, ServiceType};
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const SERVICE_TYPE_MESSAGE: &str =
    "Valid service type (ploughing, harvesting, spraying, other) is required.";
const REQUIRED_DATE_MISSING: &str = "Required date is missing or invalid.";
const REQUIRED_DATE_FORMAT: &str = "Invalid date format for required_date (use YYYY-MM-DD).";
const REQUIRED_DATE_PAST: &str = "Required date cannot be in the past.";
const LATITUDE_MESSAGE: &str = "Invalid latitude (must be a number between -90 and 90).";
const LONGITUDE_MESSAGE: &str = "Invalid longitude (must be a number between -180 and 180).";
const BUDGET_MESSAGE: &str = "Budget must be a non-negative number.";
const DESCRIPTION_MESSAGE: &str = "Description must be text.";

/// A single client-supplied value before its type is checked.
///
/// Numbers keep their literal text so that amounts parse exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// A JSON number, as written.
    Number(String),
    /// A JSON string.
    Text(String),
    /// A boolean, array or object.
    Other,
}

impl RawInput {
    /// Returns the value as a float if it was sent as a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(literal) => literal.parse().ok(),
            Self::Text(_) | Self::Other => None,
        }
    }

    /// Returns the value as an exact decimal if it was sent as a number or
    /// as a numeric string.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(literal) | Self::Text(literal) => {
                let trimmed: &str = literal.trim();
                trimmed
                    .parse()
                    .ok()
                    .or_else(|| Decimal::from_scientific(trimmed).ok())
            }
            Self::Other => None,
        }
    }

    /// Returns the value as a whole number if it was sent as an integer or
    /// as a string of digits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(literal) | Self::Text(literal) => literal.trim().parse().ok(),
            Self::Other => None,
        }
    }

    /// Returns the string if the value was sent as one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) | Self::Other => None,
        }
    }

    /// Consumes the value, returning the string if it was sent as one.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) | Self::Other => None,
        }
    }
}

impl From<&str> for RawInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawInput {
    fn from(value: f64) -> Self {
        Self::Number(value.to_string())
    }
}

impl From<i64> for RawInput {
    fn from(value: i64) -> Self {
        Self::Number(value.to_string())
    }
}

impl From<Decimal> for RawInput {
    fn from(value: Decimal) -> Self {
        Self::Number(value.to_string())
    }
}

/// Raw, unvalidated input for a new service request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRequestDraft {
    /// Service type as supplied by the client.
    pub service_type: Option<RawInput>,
    /// Free-form description.
    pub description: Option<RawInput>,
    /// Latitude in degrees.
    pub location_lat: Option<RawInput>,
    /// Longitude in degrees.
    pub location_lon: Option<RawInput>,
    /// Required date as supplied by the client.
    pub required_date: Option<RawInput>,
    /// Budget as supplied by the client.
    pub budget: Option<RawInput>,
}

/// Parses a required date given either as `YYYY-MM-DD` or as an RFC 3339
/// timestamp, in which case its calendar date is used.
#[must_use]
pub fn parse_required_date(value: &str) -> Option<Date> {
    let trimmed: &str = value.trim();
    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| {
            OffsetDateTime::parse(trimmed, &Rfc3339)
                .ok()
                .map(OffsetDateTime::date)
        })
}

/// Validates a service request draft against the marketplace input rules.
///
/// # Arguments
///
/// * `draft` - The raw input
/// * `today` - The current calendar day; `required_date` may not precede it
///
/// # Returns
///
/// * `Ok(NewServiceRequest)` with typed fields when every rule holds
/// * `Err(DomainError::ValidationFailed)` listing every violated field
///
/// # Errors
///
/// Returns an error if:
/// - `service_type` is missing, not a string, or not a known service
/// - `description` is present but not a string
/// - `required_date` is missing, not a string, unparseable, or before `today`
/// - `location_lat` or `location_lon` is not a number or is out of range
/// - `budget` is not a number or is negative
pub fn validate_service_request(
    draft: ServiceRequestDraft,
    today: Date,
) -> Result<NewServiceRequest, DomainError> {
    let mut errors: Vec<FieldError> = Vec::new();

    let service_type: Option<ServiceType> = draft
        .service_type
        .as_ref()
        .and_then(RawInput::as_text)
        .and_then(|value| value.parse().ok());
    if service_type.is_none() {
        errors.push(FieldError::new("service_type", SERVICE_TYPE_MESSAGE));
    }

    let description: Option<String> = draft.description.and_then(|value| {
        let text: Option<String> = value.into_text();
        if text.is_none() {
            errors.push(FieldError::new("description", DESCRIPTION_MESSAGE));
        }
        text
    });

    let required_date: Option<Date> = match draft.required_date.as_ref().and_then(RawInput::as_text)
    {
        None => {
            errors.push(FieldError::new("required_date", REQUIRED_DATE_MISSING));
            None
        }
        Some(value) if value.trim().is_empty() => {
            errors.push(FieldError::new("required_date", REQUIRED_DATE_MISSING));
            None
        }
        Some(value) => match parse_required_date(value) {
            None => {
                errors.push(FieldError::new("required_date", REQUIRED_DATE_FORMAT));
                None
            }
            Some(date) if date < today => {
                errors.push(FieldError::new("required_date", REQUIRED_DATE_PAST));
                None
            }
            Some(date) => Some(date),
        },
    };

    let location_lat: Option<f64> = read_bounded(
        &mut errors,
        "location_lat",
        LATITUDE_MESSAGE,
        draft.location_lat.as_ref(),
        90.0,
    );
    let location_lon: Option<f64> = read_bounded(
        &mut errors,
        "location_lon",
        LONGITUDE_MESSAGE,
        draft.location_lon.as_ref(),
        180.0,
    );

    let budget: Option<Decimal> = draft.budget.as_ref().and_then(|value| {
        let amount: Option<Decimal> = value.as_decimal().filter(|amount| *amount >= Decimal::ZERO);
        if amount.is_none() {
            errors.push(FieldError::new("budget", BUDGET_MESSAGE));
        }
        amount
    });

    match (service_type, required_date) {
        (Some(service_type), Some(required_date)) if errors.is_empty() => Ok(NewServiceRequest {
            service_type,
            description,
            location: Location::new(location_lat, location_lon),
            required_date,
            budget,
        }),
        _ => Err(DomainError::ValidationFailed { errors }),
    }
}

/// Reads an optional coordinate that must be a number within `[-limit, limit]`.
fn read_bounded(
    errors: &mut Vec<FieldError>,
    field: &str,
    message: &str,
    value: Option<&RawInput>,
    limit: f64,
) -> Option<f64> {
    let raw: &RawInput = value?;
    match raw.as_f64() {
        Some(number) if (-limit..=limit).contains(&number) => Some(number),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

/// Validates the monetary terms of an offer.
///
/// Both amounts are required and must be strictly positive.
///
/// # Errors
///
/// Returns `DomainError::ValidationFailed` naming each missing or
/// non-positive amount.
pub fn validate_offer_terms(
    offered_price: Option<Decimal>,
    estimated_cost: Option<Decimal>,
) -> Result<(Decimal, Decimal), DomainError> {
    check_offer_amounts(offered_price.map(Some), estimated_cost.map(Some))
}

/// Validates offer amounts as supplied by the client.
///
/// Amounts may be sent as numbers or numeric strings. Anything else is
/// reported against its field.
///
/// # Errors
///
/// Returns `DomainError::ValidationFailed` naming each missing, non-numeric
/// or non-positive amount.
pub fn validate_offer_input(
    offered_price: Option<&RawInput>,
    estimated_cost: Option<&RawInput>,
) -> Result<(Decimal, Decimal), DomainError> {
    check_offer_amounts(
        offered_price.map(RawInput::as_decimal),
        estimated_cost.map(RawInput::as_decimal),
    )
}

/// The outer `Option` is presence; the inner one is whether the value was numeric.
fn check_offer_amounts(
    offered_price: Option<Option<Decimal>>,
    estimated_cost: Option<Option<Decimal>>,
) -> Result<(Decimal, Decimal), DomainError> {
    let mut errors: Vec<FieldError> = Vec::new();

    let mut check = |field: &str, label: &str, value: Option<Option<Decimal>>| match value {
        None => {
            errors.push(FieldError::new(field, &format!("{label} is required.")));
            None
        }
        Some(Some(amount)) if amount > Decimal::ZERO => Some(amount),
        Some(_) => {
            errors.push(FieldError::new(
                field,
                &format!("{label} must be a positive number."),
            ));
            None
        }
    };

    let price: Option<Decimal> = check("offered_price", "Offered price", offered_price);
    let cost: Option<Decimal> = check("estimated_cost", "Estimated cost", estimated_cost);

    match (price, cost) {
        (Some(price), Some(cost)) => Ok((price, cost)),
        _ => Err(DomainError::ValidationFailed { errors }),
    }
}
