// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    FARMER, PROVIDER_ONE, PROVIDER_TWO, REQUEST_ID, create_assigned_aggregate,
    create_open_aggregate, create_test_new_request, create_test_now, create_test_offer,
    create_test_request,
};
use crate::{
    Command, CoreError, Effect, NewOffer, NotificationKind, Outcome, RequestAggregate,
    TransitionResult, apply,
};
use agri_connect_domain::{DomainError, OfferStatus, RequestStatus};
use rust_decimal::Decimal;

fn create_offer_command(provider_id: i64, request_id: i64) -> Command {
    Command::CreateOffer {
        provider_id,
        request_id,
        offered_price: Decimal::new(4800, 0),
        estimated_cost: Decimal::new(4200, 0),
        notes: Some(String::from("Can start at dawn")),
    }
}

#[test]
fn test_create_request_emits_single_insert() {
    let command: Command = Command::CreateRequest {
        farmer_id: FARMER,
        request: create_test_new_request(),
    };

    let result: TransitionResult = apply(None, command, create_test_now()).unwrap();

    assert_eq!(result.outcome, Outcome::RequestCreated);
    assert!(result.notifications.is_empty());
    assert_eq!(
        result.effects,
        vec![Effect::InsertRequest {
            farmer_id: FARMER,
            request: create_test_new_request(),
            created_at: create_test_now(),
        }]
    );
}

#[test]
fn test_create_offer_on_pending_request_inserts_pending_offer() {
    let aggregate: RequestAggregate =
        RequestAggregate::new(create_test_request(RequestStatus::Pending), Vec::new());

    let result: TransitionResult = apply(
        Some(&aggregate),
        create_offer_command(PROVIDER_ONE, REQUEST_ID),
        create_test_now(),
    )
    .unwrap();

    assert_eq!(
        result.effects,
        vec![Effect::InsertOffer(NewOffer {
            request_id: REQUEST_ID,
            provider_id: PROVIDER_ONE,
            offered_price: Decimal::new(4800, 0),
            estimated_cost: Decimal::new(4200, 0),
            notes: Some(String::from("Can start at dawn")),
            created_at: create_test_now(),
        })]
    );
    assert_eq!(
        result.outcome,
        Outcome::OfferCreated {
            request_id: REQUEST_ID
        }
    );
}

#[test]
fn test_create_offer_notifies_farmer() {
    let aggregate: RequestAggregate =
        RequestAggregate::new(create_test_request(RequestStatus::Pending), Vec::new());

    let result: TransitionResult = apply(
        Some(&aggregate),
        create_offer_command(PROVIDER_ONE, REQUEST_ID),
        create_test_now(),
    )
    .unwrap();

    assert_eq!(result.notifications.len(), 1);
    assert_eq!(result.notifications[0].user_id, FARMER);
    assert_eq!(result.notifications[0].kind, NotificationKind::OfferReceived);
    assert!(result.notifications[0].message.contains("ploughing"));
}

#[test]
fn test_create_offer_on_missing_request_is_not_open() {
    let result: Result<TransitionResult, CoreError> = apply(
        None,
        create_offer_command(PROVIDER_ONE, 999),
        create_test_now(),
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::RequestNotOpen(999)))
    );
}

#[test]
fn test_create_offer_on_in_progress_request_is_not_open() {
    let aggregate: RequestAggregate = create_assigned_aggregate();

    let result: Result<TransitionResult, CoreError> = apply(
        Some(&aggregate),
        create_offer_command(PROVIDER_TWO, REQUEST_ID),
        create_test_now(),
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::RequestNotOpen(
            REQUEST_ID
        )))
    );
}

#[test]
fn test_self_offer_is_rejected() {
    let aggregate: RequestAggregate = create_open_aggregate();

    let result: Result<TransitionResult, CoreError> = apply(
        Some(&aggregate),
        create_offer_command(FARMER, REQUEST_ID),
        create_test_now(),
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::SelfOffer {
            request_id: REQUEST_ID
        }))
    );
}

#[test]
fn test_second_pending_offer_from_same_provider_conflicts() {
    let aggregate: RequestAggregate = create_open_aggregate();

    let result: Result<TransitionResult, CoreError> = apply(
        Some(&aggregate),
        create_offer_command(PROVIDER_ONE, REQUEST_ID),
        create_test_now(),
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::DuplicatePendingOffer {
                request_id: REQUEST_ID,
                provider_id: PROVIDER_ONE,
            }
        ))
    );
}

#[test]
fn test_provider_may_offer_again_after_rejection() {
    let aggregate: RequestAggregate = RequestAggregate::new(
        create_test_request(RequestStatus::Pending),
        vec![create_test_offer(100, PROVIDER_ONE, OfferStatus::Rejected)],
    );

    let result: Result<TransitionResult, CoreError> = apply(
        Some(&aggregate),
        create_offer_command(PROVIDER_ONE, REQUEST_ID),
        create_test_now(),
    );

    assert!(result.is_ok());
}

#[test]
fn test_non_positive_offer_amounts_fail_validation() {
    let aggregate: RequestAggregate = create_open_aggregate();
    let command: Command = Command::CreateOffer {
        provider_id: 9,
        request_id: REQUEST_ID,
        offered_price: Decimal::ZERO,
        estimated_cost: Decimal::new(-5, 0),
        notes: None,
    };

    let result: Result<TransitionResult, CoreError> =
        apply(Some(&aggregate), command, create_test_now());

    match result {
        Err(CoreError::DomainViolation(DomainError::ValidationFailed { errors })) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0].field, "offered_price");
            assert_eq!(errors[1].field, "estimated_cost");
        }
        other => panic!("Expected validation failure, got {other:?}"),
    }
}
