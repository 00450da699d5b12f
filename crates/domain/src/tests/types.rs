// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Location, OfferStatus, RequestStatus, ServiceType};
use std::str::FromStr;

#[test]
fn test_service_type_round_trips_through_str() {
    for service_type in ServiceType::ALL {
        let parsed: ServiceType = service_type.as_str().parse().unwrap();
        assert_eq!(parsed, service_type);
    }
}

#[test]
fn test_service_type_rejects_unknown_value() {
    let result: Result<ServiceType, DomainError> = ServiceType::from_str("mowing");
    assert_eq!(
        result,
        Err(DomainError::InvalidServiceType(String::from("mowing")))
    );
}

#[test]
fn test_service_type_is_case_sensitive() {
    assert!(ServiceType::from_str("Ploughing").is_err());
}

#[test]
fn test_request_status_forward_edges() {
    assert!(RequestStatus::Pending.can_transition_to(RequestStatus::InProgress));
    assert!(RequestStatus::InProgress.can_transition_to(RequestStatus::Completed));
}

#[test]
fn test_request_status_reversal_edge() {
    assert!(RequestStatus::InProgress.can_transition_to(RequestStatus::Pending));
}

#[test]
fn test_request_status_rejects_skipping_progress() {
    let result: Result<(), DomainError> =
        RequestStatus::Pending.validate_transition(RequestStatus::Completed);
    assert_eq!(
        result,
        Err(DomainError::InvalidStatusTransition {
            entity: "service request",
            from: "pending",
            to: "completed",
        })
    );
}

#[test]
fn test_completed_request_is_terminal() {
    assert!(RequestStatus::Completed.is_terminal());
    for next in [
        RequestStatus::Pending,
        RequestStatus::InProgress,
        RequestStatus::Completed,
    ] {
        assert!(!RequestStatus::Completed.can_transition_to(next));
    }
}

#[test]
fn test_request_status_parses_wire_values() {
    assert_eq!(
        RequestStatus::from_str("in_progress"),
        Ok(RequestStatus::InProgress)
    );
    assert!(RequestStatus::from_str("accepted").is_err());
}

#[test]
fn test_offer_status_edges() {
    assert!(OfferStatus::Pending.can_transition_to(OfferStatus::Accepted));
    assert!(OfferStatus::Pending.can_transition_to(OfferStatus::Rejected));
    assert!(OfferStatus::Accepted.can_transition_to(OfferStatus::Rejected));
    assert!(OfferStatus::Accepted.can_transition_to(OfferStatus::Completed));
    assert!(!OfferStatus::Pending.can_transition_to(OfferStatus::Completed));
}

#[test]
fn test_offer_terminal_statuses_have_no_exits() {
    for terminal in [OfferStatus::Rejected, OfferStatus::Completed] {
        assert!(terminal.is_terminal());
        assert!(terminal.validate_transition(OfferStatus::Pending).is_err());
        assert!(terminal.validate_transition(OfferStatus::Accepted).is_err());
    }
}

#[test]
fn test_status_serializes_snake_case() {
    let json: String = serde_json::to_string(&RequestStatus::InProgress).unwrap();
    assert_eq!(json, "\"in_progress\"");
}

#[test]
fn test_location_coordinates_require_both_parts() {
    assert_eq!(
        Location::new(Some(1.0), Some(2.0)).coordinates(),
        Some((1.0, 2.0))
    );
    assert_eq!(Location::new(Some(1.0), None).coordinates(), None);
    assert_eq!(Location::default().coordinates(), None);
}
