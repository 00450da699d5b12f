// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    FARMER, PROVIDER_ONE, PROVIDER_TWO, create_assigned_aggregate, create_open_aggregate,
    create_test_now, create_test_offer, create_test_request,
};
use crate::{CoreError, RequestAggregate};
use agri_connect_domain::{OfferStatus, RequestStatus};

fn assert_violation(aggregate: &RequestAggregate) {
    assert!(matches!(
        aggregate.validate_invariants(),
        Err(CoreError::InvariantViolation(_))
    ));
}

#[test]
fn test_consistent_aggregates_pass() {
    assert!(create_open_aggregate().validate_invariants().is_ok());
    assert!(create_assigned_aggregate().validate_invariants().is_ok());
}

#[test]
fn test_in_progress_without_assignment_fails() {
    let mut aggregate: RequestAggregate = create_assigned_aggregate();
    aggregate.request.service_provider_id = None;
    assert_violation(&aggregate);
}

#[test]
fn test_pending_with_assignment_fails() {
    let mut aggregate: RequestAggregate = create_open_aggregate();
    aggregate.request.accepted_offer_id = Some(100);
    assert_violation(&aggregate);
}

#[test]
fn test_completed_at_only_when_completed() {
    let mut aggregate: RequestAggregate = create_assigned_aggregate();
    aggregate.request.completed_at = Some(create_test_now());
    assert_violation(&aggregate);
}

#[test]
fn test_two_accepted_offers_fail() {
    let mut aggregate: RequestAggregate = create_assigned_aggregate();
    aggregate.offers[1].status = OfferStatus::Accepted;
    assert_violation(&aggregate);
}

#[test]
fn test_unrejected_sibling_of_accepted_offer_fails() {
    let mut aggregate: RequestAggregate = create_assigned_aggregate();
    aggregate.offers[1].status = OfferStatus::Pending;
    assert_violation(&aggregate);
}

#[test]
fn test_accepted_offer_from_wrong_provider_fails() {
    let mut aggregate: RequestAggregate = create_assigned_aggregate();
    aggregate.request.service_provider_id = Some(PROVIDER_TWO);
    assert_violation(&aggregate);
}

#[test]
fn test_pending_request_with_accepted_offer_fails() {
    let aggregate: RequestAggregate = RequestAggregate::new(
        create_test_request(RequestStatus::Pending),
        vec![create_test_offer(100, PROVIDER_ONE, OfferStatus::Accepted)],
    );
    assert_violation(&aggregate);
}

#[test]
fn test_offer_from_owner_fails() {
    let aggregate: RequestAggregate = RequestAggregate::new(
        create_test_request(RequestStatus::Pending),
        vec![create_test_offer(100, FARMER, OfferStatus::Pending)],
    );
    assert_violation(&aggregate);
}

#[test]
fn test_duplicate_pending_offers_fail() {
    let aggregate: RequestAggregate = RequestAggregate::new(
        create_test_request(RequestStatus::Pending),
        vec![
            create_test_offer(100, PROVIDER_ONE, OfferStatus::Pending),
            create_test_offer(101, PROVIDER_ONE, OfferStatus::Pending),
        ],
    );
    assert_violation(&aggregate);
}
