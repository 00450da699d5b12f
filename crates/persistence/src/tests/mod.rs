// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use agri_connect::Command;
use agri_connect_domain::{Location, NewServiceRequest, ServiceType};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::macros::{date, datetime};

use crate::{CommittedTransition, Persistence};

/// A database seeded with one farmer and two providers.
pub struct Marketplace {
    pub persistence: Persistence,
    pub farmer: i64,
    pub provider_one: i64,
    pub provider_two: i64,
}

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-03-10 09:00 UTC)
}

pub fn create_test_marketplace() -> Marketplace {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_marketplace(persistence)
}

pub fn seed_marketplace(persistence: Persistence) -> Marketplace {
    let farmer: i64 = persistence
        .create_user("ravi", "farmer", create_test_now())
        .unwrap();
    let provider_one: i64 = persistence
        .create_user("anil", "service_provider", create_test_now())
        .unwrap();
    let provider_two: i64 = persistence
        .create_user("suresh", "tractor_owner", create_test_now())
        .unwrap();

    Marketplace {
        persistence,
        farmer,
        provider_one,
        provider_two,
    }
}

pub fn create_test_new_request() -> NewServiceRequest {
    NewServiceRequest {
        service_type: ServiceType::Ploughing,
        description: Some(String::from("Plough five acres before sowing")),
        location: Location::new(Some(18.5204), Some(73.8567)),
        required_date: date!(2026 - 04 - 01),
        budget: Some(Decimal::new(500_000, 2)),
    }
}

pub fn post_request(persistence: &Persistence, farmer_id: i64, now: OffsetDateTime) -> i64 {
    let committed: CommittedTransition = persistence
        .execute(
            Command::CreateRequest {
                farmer_id,
                request: create_test_new_request(),
            },
            now,
        )
        .unwrap();
    committed.inserted_id.unwrap()
}

pub fn make_offer(
    persistence: &Persistence,
    provider_id: i64,
    request_id: i64,
    offered_price: i64,
    estimated_cost: i64,
    now: OffsetDateTime,
) -> i64 {
    let committed: CommittedTransition = persistence
        .execute(
            Command::CreateOffer {
                provider_id,
                request_id,
                offered_price: Decimal::new(offered_price, 0),
                estimated_cost: Decimal::new(estimated_cost, 0),
                notes: None,
            },
            now,
        )
        .unwrap();
    committed.inserted_id.unwrap()
}
