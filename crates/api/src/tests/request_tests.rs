// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use agri_connect::NotificationKind;
use agri_connect_domain::FieldError;
use serde_json::json;
use time::Duration;

use crate::tests::helpers::{
    Fixture, create_test_fixture, create_test_now, create_valid_request, make_offer,
    post_request,
};
use crate::{
    ApiError, ApiResult, CompleteRequestResponse, CreateServiceRequestRequest,
    CreateServiceRequestResponse, ListMyRequestsResponse, ListServiceRequestsResponse,
    VALIDATION_FAILED, accept_offer, complete_request, create_service_request, list_my_requests,
    list_open_requests,
};

#[test]
fn test_create_service_request_returns_pending_request() {
    let fixture: Fixture = create_test_fixture();

    let result: ApiResult<CreateServiceRequestResponse> = create_service_request(
        &fixture.persistence,
        create_valid_request(),
        &fixture.farmer,
        create_test_now(),
    )
    .unwrap();

    assert_eq!(result.response.message, "Service request created successfully.");
    assert_eq!(result.response.status, "pending");
    assert!(result.notifications.is_empty());

    let open: ListServiceRequestsResponse =
        list_open_requests(&fixture.persistence, &fixture.provider).unwrap();
    assert_eq!(open.count, 1);
    assert_eq!(open.requests[0].request_id, result.response.request_id);
    assert_eq!(open.requests[0].farmer_id, fixture.farmer.user_id);
    assert_eq!(open.requests[0].required_date, "2026-04-01");
    assert_eq!(open.requests[0].created_at, "2026-03-10T09:00:00Z");
}

#[test]
fn test_create_service_request_reports_every_invalid_field() {
    let fixture: Fixture = create_test_fixture();
    let request: CreateServiceRequestRequest = CreateServiceRequestRequest {
        service_type: Some(json!("irrigation")),
        location_lat: Some(json!(91.0)),
        required_date: Some(json!("2026-03-09")),
        ..create_valid_request()
    };

    let err: ApiError = create_service_request(
        &fixture.persistence,
        request,
        &fixture.farmer,
        create_test_now(),
    )
    .unwrap_err();

    let ApiError::Validation { message, errors } = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(message, VALIDATION_FAILED);
    let fields: Vec<&str> = errors.iter().map(|e: &FieldError| e.field.as_str()).collect();
    assert_eq!(fields, vec!["service_type", "required_date", "location_lat"]);
}

#[test]
fn test_create_service_request_reports_mistyped_fields_with_the_rest() {
    let fixture: Fixture = create_test_fixture();
    let request: CreateServiceRequestRequest = CreateServiceRequestRequest {
        service_type: Some(json!("mowing")),
        description: None,
        location_lat: Some(json!("north")),
        location_lon: Some(json!(73.8567)),
        required_date: Some(json!("2000-01-01")),
        budget: Some(json!(-5)),
    };

    let err: ApiError = create_service_request(
        &fixture.persistence,
        request,
        &fixture.farmer,
        create_test_now(),
    )
    .unwrap_err();

    let ApiError::Validation { errors, .. } = err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields: Vec<&str> = errors.iter().map(|e: &FieldError| e.field.as_str()).collect();
    assert_eq!(
        fields,
        vec!["service_type", "required_date", "location_lat", "budget"]
    );
}

#[test]
fn test_null_optional_fields_are_treated_as_absent() {
    let fixture: Fixture = create_test_fixture();
    let request: CreateServiceRequestRequest = CreateServiceRequestRequest {
        description: Some(json!(null)),
        budget: Some(json!(null)),
        ..create_valid_request()
    };

    assert!(
        create_service_request(
            &fixture.persistence,
            request,
            &fixture.farmer,
            create_test_now(),
        )
        .is_ok()
    );
}

#[test]
fn test_required_date_today_is_accepted() {
    let fixture: Fixture = create_test_fixture();
    let request: CreateServiceRequestRequest = CreateServiceRequestRequest {
        required_date: Some(json!("2026-03-10")),
        ..create_valid_request()
    };

    assert!(
        create_service_request(
            &fixture.persistence,
            request,
            &fixture.farmer,
            create_test_now() + Duration::hours(14),
        )
        .is_ok()
    );
}

#[test]
fn test_open_requests_exclude_assigned_requests() {
    let fixture: Fixture = create_test_fixture();
    let assigned: i64 = post_request(&fixture, &fixture.farmer);
    let open: i64 = post_request(&fixture, &fixture.other_farmer);
    let offer_id: i64 = make_offer(&fixture, &fixture.provider, assigned, 1500);
    accept_offer(
        &fixture.persistence,
        offer_id,
        &fixture.farmer,
        create_test_now(),
    )
    .unwrap();

    let listed: ListServiceRequestsResponse =
        list_open_requests(&fixture.persistence, &fixture.tractor_owner).unwrap();

    assert_eq!(listed.count, 1);
    assert_eq!(listed.requests[0].request_id, open);
}

#[test]
fn test_my_requests_include_offers_and_exclude_other_farmers() {
    let fixture: Fixture = create_test_fixture();
    let mine: i64 = post_request(&fixture, &fixture.farmer);
    post_request(&fixture, &fixture.other_farmer);
    make_offer(&fixture, &fixture.provider, mine, 1500);
    make_offer(&fixture, &fixture.tractor_owner, mine, 1400);

    let listed: ListMyRequestsResponse =
        list_my_requests(&fixture.persistence, &fixture.farmer).unwrap();

    assert_eq!(listed.message, "My service requests fetched successfully.");
    assert_eq!(listed.count, 1);
    assert_eq!(listed.requests[0].request.request_id, mine);
    assert_eq!(listed.requests[0].offers.len(), 2);
}

#[test]
fn test_assigned_provider_completes_request() {
    let fixture: Fixture = create_test_fixture();
    let request_id: i64 = post_request(&fixture, &fixture.farmer);
    let offer_id: i64 = make_offer(&fixture, &fixture.provider, request_id, 1500);
    accept_offer(
        &fixture.persistence,
        offer_id,
        &fixture.farmer,
        create_test_now(),
    )
    .unwrap();

    let result: ApiResult<CompleteRequestResponse> = complete_request(
        &fixture.persistence,
        request_id,
        &fixture.provider,
        create_test_now() + Duration::days(20),
    )
    .unwrap();

    assert_eq!(
        result.response.message,
        "Service request marked as completed successfully!"
    );
    assert_eq!(result.notifications.len(), 1);
    assert_eq!(result.notifications[0].user_id, fixture.farmer.user_id);
    assert_eq!(
        result.notifications[0].kind,
        NotificationKind::RequestCompleted
    );

    let listed: ListMyRequestsResponse =
        list_my_requests(&fixture.persistence, &fixture.farmer).unwrap();
    assert_eq!(listed.requests[0].request.status, "completed");
    assert_eq!(
        listed.requests[0].request.completed_at.as_deref(),
        Some("2026-03-30T09:00:00Z")
    );
    assert_eq!(listed.requests[0].offers[0].status, "completed");
}

#[test]
fn test_other_provider_cannot_complete_request() {
    let fixture: Fixture = create_test_fixture();
    let request_id: i64 = post_request(&fixture, &fixture.farmer);
    let offer_id: i64 = make_offer(&fixture, &fixture.provider, request_id, 1500);
    accept_offer(
        &fixture.persistence,
        offer_id,
        &fixture.farmer,
        create_test_now(),
    )
    .unwrap();

    let err: ApiError = complete_request(
        &fixture.persistence,
        request_id,
        &fixture.tractor_owner,
        create_test_now(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::Forbidden { .. }));
}

#[test]
fn test_pending_request_cannot_be_completed() {
    let fixture: Fixture = create_test_fixture();
    let request_id: i64 = post_request(&fixture, &fixture.farmer);

    let err: ApiError = complete_request(
        &fixture.persistence,
        request_id,
        &fixture.provider,
        create_test_now(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        ApiError::InvalidState {
            message: String::from(
                "Cannot mark a request as completed unless it is in progress (current status: pending)."
            ),
        }
    );
}

#[test]
fn test_completing_unknown_request_is_not_found() {
    let fixture: Fixture = create_test_fixture();

    let err: ApiError = complete_request(
        &fixture.persistence,
        4242,
        &fixture.provider,
        create_test_now(),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::NotFound { .. }));
}
