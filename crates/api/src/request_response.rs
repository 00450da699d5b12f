// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Request bodies take every field as a raw JSON value so that a missing
//! or mistyped field is reported as a validation error naming the field,
//! not as a parse error. Every response carries a `message`.

use agri_connect_domain::{Offer, RawInput, ServiceRequest, ServiceRequestDraft};
use agri_connect_persistence::{OfferView, RequestWithOffers};
use rust_decimal::Decimal;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ApiError;

/// API request to post a service request.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CreateServiceRequestRequest {
    /// One of ploughing, harvesting, spraying, other.
    pub service_type: Option<Value>,
    /// Free-text description.
    pub description: Option<Value>,
    /// Latitude in degrees.
    pub location_lat: Option<Value>,
    /// Longitude in degrees.
    pub location_lon: Option<Value>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub required_date: Option<Value>,
    /// Optional non-negative budget, as a number or numeric string.
    pub budget: Option<Value>,
}

impl CreateServiceRequestRequest {
    /// Hands the body to domain validation without interpreting it.
    #[must_use]
    pub fn into_draft(self) -> ServiceRequestDraft {
        ServiceRequestDraft {
            service_type: raw_input(self.service_type),
            description: raw_input(self.description),
            location_lat: raw_input(self.location_lat),
            location_lon: raw_input(self.location_lon),
            required_date: raw_input(self.required_date),
            budget: raw_input(self.budget),
        }
    }
}

/// API request to bid on a service request.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CreateOfferRequest {
    /// The request being bid on.
    pub request_id: Option<Value>,
    /// The price the provider will charge.
    pub offered_price: Option<Value>,
    /// The provider's own cost estimate.
    pub estimated_cost: Option<Value>,
    /// Optional notes for the farmer.
    pub notes: Option<Value>,
}

/// Converts a body field, treating JSON `null` as absent.
pub(crate) fn raw_input(value: Option<Value>) -> Option<RawInput> {
    match value? {
        Value::Null => None,
        Value::Number(number) => Some(RawInput::Number(number.to_string())),
        Value::String(text) => Some(RawInput::Text(text)),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Some(RawInput::Other),
    }
}

/// A service request as shown to callers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ServiceRequestInfo {
    pub request_id: i64,
    pub farmer_id: i64,
    pub service_type: String,
    pub description: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
    /// `YYYY-MM-DD`.
    pub required_date: String,
    pub budget: Option<Decimal>,
    pub status: String,
    pub accepted_offer_id: Option<i64>,
    pub service_provider_id: Option<i64>,
    /// RFC 3339.
    pub completed_at: Option<String>,
    /// RFC 3339.
    pub created_at: String,
}

/// An offer as shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OfferInfo {
    pub offer_id: i64,
    pub request_id: i64,
    pub provider_id: i64,
    pub offered_price: Decimal,
    pub estimated_cost: Decimal,
    pub notes: Option<String>,
    pub status: String,
    /// RFC 3339.
    pub created_at: String,
}

/// An offer with the request it was made on and both parties' names.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OfferDetail {
    #[serde(flatten)]
    pub offer: OfferInfo,
    pub service_type: String,
    pub request_description: Option<String>,
    pub farmer_id: i64,
    pub request_status: String,
    pub service_provider_username: Option<String>,
    pub farmer_username: Option<String>,
}

/// A farmer's request with its offers, newest first.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestWithOffersInfo {
    #[serde(flatten)]
    pub request: ServiceRequestInfo,
    pub offers: Vec<OfferInfo>,
}

fn rfc3339(value: OffsetDateTime) -> Result<String, ApiError> {
    value.format(&Rfc3339).map_err(|e| ApiError::Internal {
        message: format!("Failed to format timestamp: {e}"),
    })
}

impl ServiceRequestInfo {
    /// Builds the caller view of a request.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if a timestamp cannot be formatted.
    pub fn from_domain(request: &ServiceRequest) -> Result<Self, ApiError> {
        Ok(Self {
            request_id: request.request_id,
            farmer_id: request.farmer_id,
            service_type: request.service_type.as_str().to_string(),
            description: request.description.clone(),
            location_lat: request.location.lat,
            location_lon: request.location.lon,
            required_date: request.required_date.to_string(),
            budget: request.budget,
            status: request.status.as_str().to_string(),
            accepted_offer_id: request.accepted_offer_id,
            service_provider_id: request.service_provider_id,
            completed_at: request.completed_at.map(rfc3339).transpose()?,
            created_at: rfc3339(request.created_at)?,
        })
    }
}

impl OfferInfo {
    /// Builds the caller view of an offer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if a timestamp cannot be formatted.
    pub fn from_domain(offer: &Offer) -> Result<Self, ApiError> {
        Ok(Self {
            offer_id: offer.offer_id,
            request_id: offer.request_id,
            provider_id: offer.provider_id,
            offered_price: offer.offered_price,
            estimated_cost: offer.estimated_cost,
            notes: offer.notes.clone(),
            status: offer.status.as_str().to_string(),
            created_at: rfc3339(offer.created_at)?,
        })
    }
}

impl OfferDetail {
    /// Builds the caller view of a joined offer row.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if a timestamp cannot be formatted.
    pub fn from_view(view: &OfferView) -> Result<Self, ApiError> {
        Ok(Self {
            offer: OfferInfo::from_domain(&view.offer)?,
            service_type: view.service_type.as_str().to_string(),
            request_description: view.request_description.clone(),
            farmer_id: view.farmer_id,
            request_status: view.request_status.as_str().to_string(),
            service_provider_username: view.provider_username.clone(),
            farmer_username: view.farmer_username.clone(),
        })
    }
}

impl RequestWithOffersInfo {
    /// Builds the caller view of a request and its offers.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if a timestamp cannot be formatted.
    pub fn from_record(record: &RequestWithOffers) -> Result<Self, ApiError> {
        Ok(Self {
            request: ServiceRequestInfo::from_domain(&record.request)?,
            offers: record
                .offers
                .iter()
                .map(OfferInfo::from_domain)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// API response for a created service request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateServiceRequestResponse {
    pub message: String,
    pub request_id: i64,
    pub status: String,
}

/// API response listing service requests.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ListServiceRequestsResponse {
    pub message: String,
    pub count: usize,
    pub requests: Vec<ServiceRequestInfo>,
}

/// API response listing a farmer's requests with offers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ListMyRequestsResponse {
    pub message: String,
    pub count: usize,
    pub requests: Vec<RequestWithOffersInfo>,
}

/// API response for a completed request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompleteRequestResponse {
    pub message: String,
    pub request_id: i64,
}

/// API response for a created offer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateOfferResponse {
    pub message: String,
    pub offer_id: i64,
    pub status: String,
}

/// API response listing offers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListOffersResponse {
    pub message: String,
    pub count: usize,
    pub offers: Vec<OfferDetail>,
}

/// API response for a single offer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GetOfferResponse {
    pub message: String,
    pub offer: OfferDetail,
}

/// API response for an accepted offer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AcceptOfferResponse {
    pub message: String,
    pub offer_id: i64,
    pub request_id: i64,
}

/// API response for a rejected offer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RejectOfferResponse {
    pub message: String,
    pub offer_id: i64,
    /// True if the request went back to pending.
    pub request_reverted: bool,
}
