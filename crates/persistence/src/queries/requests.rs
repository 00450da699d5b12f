// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Service request queries.

use std::collections::HashMap;

use agri_connect::{AggregateKey, RequestAggregate};
use agri_connect_domain::{Offer, RequestStatus, ServiceRequest};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::{OfferRow, RequestWithOffers, ServiceRequestRow};
use crate::diesel_schema::{offers, service_requests};
use crate::error::PersistenceError;

/// Retrieves a single service request.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `request_id` - The request to fetch
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
/// Returns `Ok(None)` if the request does not exist.
pub fn get_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<Option<ServiceRequest>, PersistenceError> {
    service_requests::table
        .find(request_id)
        .select(ServiceRequestRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_request: {e}")))?
        .map(ServiceRequestRow::into_domain)
        .transpose()
}

/// Loads the aggregate a command operates on.
///
/// An offer key resolves to the request the offer belongs to. A key that
/// names nothing yields `Ok(None)`; the transition engine decides what
/// that means for the command.
///
/// # Errors
///
/// Returns an error if a query fails or a row is malformed.
pub fn load_aggregate(
    conn: &mut SqliteConnection,
    key: AggregateKey,
) -> Result<Option<RequestAggregate>, PersistenceError> {
    let request_id: i64 = match key {
        AggregateKey::New => return Ok(None),
        AggregateKey::Request(request_id) => request_id,
        AggregateKey::Offer(offer_id) => {
            let owner: Option<i64> = offers::table
                .find(offer_id)
                .select(offers::request_id)
                .first(conn)
                .optional()
                .map_err(|e| PersistenceError::QueryFailed(format!("load_aggregate: {e}")))?;
            match owner {
                Some(request_id) => request_id,
                None => return Ok(None),
            }
        }
    };

    let Some(request) = get_request(conn, request_id)? else {
        return Ok(None);
    };

    let offers: Vec<Offer> = offers::table
        .filter(offers::request_id.eq(request_id))
        .order(offers::offer_id.asc())
        .select(OfferRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("load_aggregate: {e}")))?
        .into_iter()
        .map(OfferRow::into_domain)
        .collect::<Result<_, _>>()?;

    debug!(request_id, offers = offers.len(), "Loaded request aggregate");

    Ok(Some(RequestAggregate::new(request, offers)))
}

/// Lists every request still open to offers, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_open_requests(
    conn: &mut SqliteConnection,
) -> Result<Vec<ServiceRequest>, PersistenceError> {
    service_requests::table
        .filter(service_requests::status.eq(RequestStatus::Pending.as_str()))
        .order((
            service_requests::created_at.desc(),
            service_requests::request_id.desc(),
        ))
        .select(ServiceRequestRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_open_requests: {e}")))?
        .into_iter()
        .map(ServiceRequestRow::into_domain)
        .collect()
}

/// Lists a farmer's requests, newest first, each with its offers newest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `farmer_id` - The owning farmer
///
/// # Errors
///
/// Returns an error if a query fails or a row is malformed.
pub fn list_requests_for_farmer(
    conn: &mut SqliteConnection,
    farmer_id: i64,
) -> Result<Vec<RequestWithOffers>, PersistenceError> {
    let requests: Vec<ServiceRequest> = service_requests::table
        .filter(service_requests::farmer_id.eq(farmer_id))
        .order((
            service_requests::created_at.desc(),
            service_requests::request_id.desc(),
        ))
        .select(ServiceRequestRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_requests_for_farmer: {e}")))?
        .into_iter()
        .map(ServiceRequestRow::into_domain)
        .collect::<Result<_, _>>()?;

    let request_ids: Vec<i64> = requests.iter().map(|r| r.request_id).collect();
    let offer_rows: Vec<OfferRow> = offers::table
        .filter(offers::request_id.eq_any(&request_ids))
        .order((offers::created_at.desc(), offers::offer_id.desc()))
        .select(OfferRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_requests_for_farmer: {e}")))?;

    let mut by_request: HashMap<i64, Vec<Offer>> = HashMap::new();
    for row in offer_rows {
        let offer: Offer = row.into_domain()?;
        by_request.entry(offer.request_id).or_default().push(offer);
    }

    Ok(requests
        .into_iter()
        .map(|request| {
            let offers: Vec<Offer> = by_request.remove(&request.request_id).unwrap_or_default();
            RequestWithOffers { request, offers }
        })
        .collect())
}
