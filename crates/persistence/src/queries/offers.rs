// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Offer listing queries.
//!
//! Offers are always returned joined with the request they were made on
//! and the usernames of both parties, newest first.

use std::collections::HashMap;

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{OfferRow, OfferScope, OfferView, RequestSummaryRow};
use crate::diesel_schema::{offers, service_requests, users};
use crate::error::PersistenceError;

/// Lists offers within a scope.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `scope` - Which offers to include
///
/// # Errors
///
/// Returns an error if a query fails or a row is malformed.
pub fn list_offers(
    conn: &mut SqliteConnection,
    scope: OfferScope,
) -> Result<Vec<OfferView>, PersistenceError> {
    let mut query = offers::table
        .inner_join(service_requests::table)
        .select((OfferRow::as_select(), RequestSummaryRow::as_select()))
        .order((offers::created_at.desc(), offers::offer_id.desc()))
        .into_boxed();

    match scope {
        OfferScope::All => {}
        OfferScope::ProvidedBy(provider_id) => {
            query = query.filter(offers::provider_id.eq(provider_id));
        }
        OfferScope::RequestedBy(farmer_id) => {
            query = query.filter(service_requests::farmer_id.eq(farmer_id));
        }
    }

    let rows: Vec<(OfferRow, RequestSummaryRow)> = query
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_offers: {e}")))?;

    with_usernames(conn, rows)
}

/// Retrieves a single offer with its request summary.
///
/// # Errors
///
/// Returns an error if a query fails or a row is malformed.
/// Returns `Ok(None)` if the offer does not exist.
pub fn get_offer_view(
    conn: &mut SqliteConnection,
    offer_id: i64,
) -> Result<Option<OfferView>, PersistenceError> {
    let row: Option<(OfferRow, RequestSummaryRow)> = offers::table
        .inner_join(service_requests::table)
        .filter(offers::offer_id.eq(offer_id))
        .select((OfferRow::as_select(), RequestSummaryRow::as_select()))
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_offer_view: {e}")))?;

    match row {
        Some(row) => Ok(with_usernames(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

fn with_usernames(
    conn: &mut SqliteConnection,
    rows: Vec<(OfferRow, RequestSummaryRow)>,
) -> Result<Vec<OfferView>, PersistenceError> {
    let mut user_ids: Vec<i64> = rows
        .iter()
        .flat_map(|(offer, summary)| [offer.provider_id, summary.farmer_id])
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let names: HashMap<i64, String> = users::table
        .filter(users::user_id.eq_any(&user_ids))
        .select((users::user_id, users::username))
        .load::<(i64, String)>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("with_usernames: {e}")))?
        .into_iter()
        .collect();

    rows.into_iter()
        .map(|(offer, summary)| {
            let provider_username: Option<String> = names.get(&offer.provider_id).cloned();
            let farmer_username: Option<String> = names.get(&summary.farmer_id).cloned();
            OfferView::from_rows(offer, summary, provider_username, farmer_username)
        })
        .collect()
}
