// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes that realise a transition's effects.

use agri_connect::{Effect, NewOffer, RequestState};
use agri_connect_domain::{NewServiceRequest, OfferStatus, RequestStatus};
use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use tracing::debug;

use crate::data_models::{NewOfferRow, NewServiceRequestRow};
use crate::diesel_schema::{offers, service_requests};
use crate::encoding::{encode_date, encode_decimal, encode_timestamp};
use crate::error::PersistenceError;

/// Applies effects in order on the given connection.
///
/// Must run inside a transaction; a failure part way through leaves
/// earlier writes in place until the caller rolls back.
///
/// # Returns
///
/// The id assigned by the last insert, if any effect inserted a row.
///
/// # Errors
///
/// Returns an error if a write fails or an update matches no row.
pub fn apply_effects(
    conn: &mut SqliteConnection,
    effects: &[Effect],
) -> Result<Option<i64>, PersistenceError> {
    let mut inserted_id: Option<i64> = None;

    for effect in effects {
        match effect {
            Effect::InsertRequest {
                farmer_id,
                request,
                created_at,
            } => {
                inserted_id = Some(insert_request(conn, *farmer_id, request, *created_at)?);
            }
            Effect::InsertOffer(offer) => {
                inserted_id = Some(insert_offer(conn, offer)?);
            }
            Effect::SetOfferStatus { offer_id, status } => {
                set_offer_status(conn, *offer_id, *status)?;
            }
            Effect::SetRequestState(state) => {
                set_request_state(conn, state)?;
            }
        }
    }

    Ok(inserted_id)
}

fn insert_request(
    conn: &mut SqliteConnection,
    farmer_id: i64,
    request: &NewServiceRequest,
    created_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let row: NewServiceRequestRow<'_> = NewServiceRequestRow {
        farmer_id,
        service_type: request.service_type.as_str(),
        description: request.description.as_deref(),
        location_lat: request.location.lat,
        location_lon: request.location.lon,
        required_date: encode_date(request.required_date)?,
        budget: request.budget.map(encode_decimal),
        status: RequestStatus::Pending.as_str(),
        created_at: encode_timestamp(created_at)?,
    };

    let request_id: i64 = diesel::insert_into(service_requests::table)
        .values(&row)
        .returning(service_requests::request_id)
        .get_result(conn)?;

    debug!(request_id, farmer_id, "Inserted service request");
    Ok(request_id)
}

fn insert_offer(conn: &mut SqliteConnection, offer: &NewOffer) -> Result<i64, PersistenceError> {
    let row: NewOfferRow<'_> = NewOfferRow {
        request_id: offer.request_id,
        provider_id: offer.provider_id,
        offered_price: encode_decimal(offer.offered_price),
        estimated_cost: encode_decimal(offer.estimated_cost),
        notes: offer.notes.as_deref(),
        status: OfferStatus::Pending.as_str(),
        created_at: encode_timestamp(offer.created_at)?,
    };

    let offer_id: i64 = diesel::insert_into(offers::table)
        .values(&row)
        .returning(offers::offer_id)
        .get_result(conn)?;

    debug!(
        offer_id,
        request_id = offer.request_id,
        provider_id = offer.provider_id,
        "Inserted offer"
    );
    Ok(offer_id)
}

fn set_offer_status(
    conn: &mut SqliteConnection,
    offer_id: i64,
    status: OfferStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(offers::table.find(offer_id))
        .set(offers::status.eq(status.as_str()))
        .execute(conn)?;

    if updated != 1 {
        return Err(PersistenceError::NotFound(format!("offer {offer_id}")));
    }

    debug!(offer_id, status = status.as_str(), "Updated offer status");
    Ok(())
}

fn set_request_state(
    conn: &mut SqliteConnection,
    state: &RequestState,
) -> Result<(), PersistenceError> {
    let completed_at: Option<String> = state.completed_at.map(encode_timestamp).transpose()?;

    let updated: usize = diesel::update(service_requests::table.find(state.request_id))
        .set((
            service_requests::status.eq(state.status.as_str()),
            service_requests::accepted_offer_id.eq(state.accepted_offer_id),
            service_requests::service_provider_id.eq(state.service_provider_id),
            service_requests::completed_at.eq(completed_at),
        ))
        .execute(conn)?;

    if updated != 1 {
        return Err(PersistenceError::NotFound(format!(
            "service request {}",
            state.request_id
        )));
    }

    debug!(
        request_id = state.request_id,
        status = state.status.as_str(),
        "Updated service request state"
    );
    Ok(())
}
