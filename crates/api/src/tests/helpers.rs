// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use agri_connect_persistence::Persistence;
use rust_decimal::Decimal;
use serde_json::json;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AuthenticatedActor, CreateOfferRequest, CreateServiceRequestRequest, Role, create_offer,
    create_service_request,
};

/// A marketplace with one user of each kind plus a second farmer and
/// a second provider.
pub struct Fixture {
    pub persistence: Persistence,
    pub farmer: AuthenticatedActor,
    pub other_farmer: AuthenticatedActor,
    pub provider: AuthenticatedActor,
    pub tractor_owner: AuthenticatedActor,
    pub admin: AuthenticatedActor,
}

pub fn create_test_now() -> OffsetDateTime {
    datetime!(2026-03-10 09:00 UTC)
}

fn register(persistence: &Persistence, username: &str, role: Role) -> AuthenticatedActor {
    let user_id: i64 = persistence
        .create_user(username, role.as_str(), create_test_now())
        .unwrap();
    AuthenticatedActor::new(user_id, role)
}

pub fn create_test_fixture() -> Fixture {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    let farmer: AuthenticatedActor = register(&persistence, "ravi", Role::Farmer);
    let other_farmer: AuthenticatedActor = register(&persistence, "meena", Role::Farmer);
    let provider: AuthenticatedActor = register(&persistence, "anil", Role::ServiceProvider);
    let tractor_owner: AuthenticatedActor = register(&persistence, "suresh", Role::TractorOwner);
    let admin: AuthenticatedActor = register(&persistence, "root", Role::Admin);

    Fixture {
        persistence,
        farmer,
        other_farmer,
        provider,
        tractor_owner,
        admin,
    }
}

pub fn create_valid_request() -> CreateServiceRequestRequest {
    CreateServiceRequestRequest {
        service_type: Some(json!("ploughing")),
        description: Some(json!("Two acres behind the well")),
        location_lat: Some(json!(18.5204)),
        location_lon: Some(json!(73.8567)),
        required_date: Some(json!("2026-04-01")),
        budget: Some(json!("5000.00")),
    }
}

pub fn create_offer_body(request_id: i64, price: i64) -> CreateOfferRequest {
    CreateOfferRequest {
        request_id: Some(json!(request_id)),
        offered_price: Some(json!(Decimal::new(price * 100, 2).to_string())),
        estimated_cost: Some(json!(Decimal::new((price - 100) * 100, 2).to_string())),
        notes: None,
    }
}

/// Posts a valid request as `farmer` and returns its id.
pub fn post_request(fixture: &Fixture, farmer: &AuthenticatedActor) -> i64 {
    create_service_request(
        &fixture.persistence,
        create_valid_request(),
        farmer,
        create_test_now(),
    )
    .unwrap()
    .response
    .request_id
}

/// Makes an offer as `provider` and returns its id.
pub fn make_offer(
    fixture: &Fixture,
    provider: &AuthenticatedActor,
    request_id: i64,
    price: i64,
) -> i64 {
    create_offer(
        &fixture.persistence,
        create_offer_body(request_id, price),
        provider,
        create_test_now(),
    )
    .unwrap()
    .response
    .offer_id
}
