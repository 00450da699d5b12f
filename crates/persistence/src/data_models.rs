// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and the read models built from them.
//!
//! Row structs mirror the tables exactly and hold the stored text
//! encodings. `into_domain` decodes them, reporting malformed values as
//! `PersistenceError::CorruptRecord` rather than panicking.

use agri_connect_domain::{
    DomainError, Location, Offer, OfferStatus, RequestStatus, ServiceRequest, ServiceType,
};
use diesel::prelude::*;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::diesel_schema::{offers, service_requests, users};
use crate::encoding::{decode_date, decode_decimal, decode_timestamp};
use crate::error::PersistenceError;

const REQUESTS: &str = "service_requests";
const OFFERS: &str = "offers";
const USERS: &str = "users";

fn corrupt(table: &'static str) -> impl Fn(DomainError) -> PersistenceError {
    move |err: DomainError| PersistenceError::CorruptRecord {
        table,
        reason: err.to_string(),
    }
}

/// Diesel Queryable struct for service request rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = service_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ServiceRequestRow {
    pub request_id: i64,
    pub farmer_id: i64,
    pub service_type: String,
    pub description: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
    pub required_date: String,
    pub budget: Option<String>,
    pub status: String,
    pub accepted_offer_id: Option<i64>,
    pub service_provider_id: Option<i64>,
    pub completed_at: Option<String>,
    pub created_at: String,
}

impl ServiceRequestRow {
    /// Decodes the row into a domain request.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if any column is malformed.
    pub fn into_domain(self) -> Result<ServiceRequest, PersistenceError> {
        let service_type: ServiceType = self.service_type.parse().map_err(corrupt(REQUESTS))?;
        let status: RequestStatus = self.status.parse().map_err(corrupt(REQUESTS))?;
        let budget: Option<Decimal> = self
            .budget
            .as_deref()
            .map(|value| decode_decimal(REQUESTS, value))
            .transpose()?;
        let completed_at: Option<OffsetDateTime> = self
            .completed_at
            .as_deref()
            .map(|value| decode_timestamp(REQUESTS, value))
            .transpose()?;

        Ok(ServiceRequest {
            request_id: self.request_id,
            farmer_id: self.farmer_id,
            service_type,
            description: self.description,
            location: Location::new(self.location_lat, self.location_lon),
            required_date: decode_date(REQUESTS, &self.required_date)?,
            budget,
            status,
            accepted_offer_id: self.accepted_offer_id,
            service_provider_id: self.service_provider_id,
            completed_at,
            created_at: decode_timestamp(REQUESTS, &self.created_at)?,
        })
    }
}

/// Diesel Queryable struct for offer rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = offers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OfferRow {
    pub offer_id: i64,
    pub request_id: i64,
    pub provider_id: i64,
    pub offered_price: String,
    pub estimated_cost: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl OfferRow {
    /// Decodes the row into a domain offer.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if any column is malformed.
    pub fn into_domain(self) -> Result<Offer, PersistenceError> {
        let status: OfferStatus = self.status.parse().map_err(corrupt(OFFERS))?;

        Ok(Offer {
            offer_id: self.offer_id,
            request_id: self.request_id,
            provider_id: self.provider_id,
            offered_price: decode_decimal(OFFERS, &self.offered_price)?,
            estimated_cost: decode_decimal(OFFERS, &self.estimated_cost)?,
            notes: self.notes,
            status,
            created_at: decode_timestamp(OFFERS, &self.created_at)?,
        })
    }
}

/// The request columns shown alongside an offer in listings.
#[derive(Queryable, Selectable)]
#[diesel(table_name = service_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RequestSummaryRow {
    pub service_type: String,
    pub description: Option<String>,
    pub farmer_id: i64,
    pub status: String,
}

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

impl UserRow {
    /// Decodes the row into user data.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if the timestamp is malformed.
    pub fn into_data(self) -> Result<UserData, PersistenceError> {
        Ok(UserData {
            user_id: self.user_id,
            username: self.username,
            role: self.role,
            created_at: decode_timestamp(USERS, &self.created_at)?,
        })
    }
}

/// Diesel Insertable struct for new service requests.
#[derive(Insertable)]
#[diesel(table_name = service_requests)]
pub struct NewServiceRequestRow<'a> {
    pub farmer_id: i64,
    pub service_type: &'a str,
    pub description: Option<&'a str>,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
    pub required_date: String,
    pub budget: Option<String>,
    pub status: &'a str,
    pub created_at: String,
}

/// Diesel Insertable struct for new offers.
#[derive(Insertable)]
#[diesel(table_name = offers)]
pub struct NewOfferRow<'a> {
    pub request_id: i64,
    pub provider_id: i64,
    pub offered_price: String,
    pub estimated_cost: String,
    pub notes: Option<&'a str>,
    pub status: &'a str,
    pub created_at: String,
}

/// A directory entry for a marketplace participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub user_id: i64,
    pub username: String,
    /// The stored role name; the API layer owns the role vocabulary.
    pub role: String,
    pub created_at: OffsetDateTime,
}

/// An offer joined with the request it was made on and both parties' names.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferView {
    pub offer: Offer,
    pub service_type: ServiceType,
    pub request_description: Option<String>,
    pub farmer_id: i64,
    pub request_status: RequestStatus,
    /// Absent if the provider is not in the users directory.
    pub provider_username: Option<String>,
    /// Absent if the farmer is not in the users directory.
    pub farmer_username: Option<String>,
}

/// A farmer's request with every offer made on it, newest offer first.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestWithOffers {
    pub request: ServiceRequest,
    pub offers: Vec<Offer>,
}

/// Which offers a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferScope {
    /// Every offer.
    All,
    /// Offers made by this provider.
    ProvidedBy(i64),
    /// Offers on requests owned by this farmer.
    RequestedBy(i64),
}

impl OfferView {
    /// Combines an offer row with its request summary and the usernames
    /// looked up for both parties.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if any column is malformed.
    pub fn from_rows(
        offer: OfferRow,
        summary: RequestSummaryRow,
        provider_username: Option<String>,
        farmer_username: Option<String>,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            offer: offer.into_domain()?,
            service_type: summary.service_type.parse().map_err(corrupt(REQUESTS))?,
            request_description: summary.description,
            farmer_id: summary.farmer_id,
            request_status: summary.status.parse().map_err(corrupt(REQUESTS))?,
            provider_username,
            farmer_username,
        })
    }
}
