// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Effect, RequestAggregate, TransitionResult};
use agri_connect_domain::{
    Location, NewServiceRequest, Offer, OfferStatus, RequestStatus, ServiceRequest, ServiceType,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::macros::{date, datetime};

pub const FARMER: i64 = 1;
pub const PROVIDER_ONE: i64 = 2;
pub const PROVIDER_TWO: i64 = 3;
pub const REQUEST_ID: i64 = 10;

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-03-10 09:00:00 UTC)
}

pub fn create_test_new_request() -> NewServiceRequest {
    NewServiceRequest {
        service_type: ServiceType::Ploughing,
        description: Some(String::from("North field")),
        location: Location::new(Some(18.52), Some(73.85)),
        required_date: date!(2026 - 03 - 11),
        budget: Some(Decimal::new(5000, 0)),
    }
}

pub fn create_test_request(status: RequestStatus) -> ServiceRequest {
    ServiceRequest {
        request_id: REQUEST_ID,
        farmer_id: FARMER,
        service_type: ServiceType::Ploughing,
        description: None,
        location: Location::default(),
        required_date: date!(2026 - 03 - 11),
        budget: Some(Decimal::new(5000, 0)),
        status,
        accepted_offer_id: None,
        service_provider_id: None,
        completed_at: None,
        created_at: datetime!(2026-03-09 08:00:00 UTC),
    }
}

pub fn create_test_offer(offer_id: i64, provider_id: i64, status: OfferStatus) -> Offer {
    Offer {
        offer_id,
        request_id: REQUEST_ID,
        provider_id,
        offered_price: Decimal::new(4500, 0),
        estimated_cost: Decimal::new(4000, 0),
        notes: None,
        status,
        created_at: datetime!(2026-03-09 10:00:00 UTC),
    }
}

/// A pending request with one pending offer from each provider
/// (offer 100 from provider one, offer 101 from provider two).
pub fn create_open_aggregate() -> RequestAggregate {
    RequestAggregate::new(
        create_test_request(RequestStatus::Pending),
        vec![
            create_test_offer(100, PROVIDER_ONE, OfferStatus::Pending),
            create_test_offer(101, PROVIDER_TWO, OfferStatus::Pending),
        ],
    )
}

/// The open aggregate after offer 100 was accepted.
pub fn create_assigned_aggregate() -> RequestAggregate {
    let mut request: ServiceRequest = create_test_request(RequestStatus::InProgress);
    request.accepted_offer_id = Some(100);
    request.service_provider_id = Some(PROVIDER_ONE);
    RequestAggregate::new(
        request,
        vec![
            create_test_offer(100, PROVIDER_ONE, OfferStatus::Accepted),
            create_test_offer(101, PROVIDER_TWO, OfferStatus::Rejected),
        ],
    )
}

/// Applies a transition's update effects to an aggregate.
pub fn project(aggregate: &RequestAggregate, result: &TransitionResult) -> RequestAggregate {
    aggregate.with_effects(&result.effects)
}

pub fn offer_status_updates(result: &TransitionResult) -> Vec<(i64, OfferStatus)> {
    result
        .effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::SetOfferStatus { offer_id, status } => Some((*offer_id, *status)),
            _ => None,
        })
        .collect()
}
