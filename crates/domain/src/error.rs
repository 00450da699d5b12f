// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{OfferStatus, RequestStatus};
use serde::{Deserialize, Serialize};

/// A single invalid input field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The offending field name, as it appears on the wire.
    pub field: String,
    /// A human-readable description of the problem.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Errors that can occur during domain validation and rule checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more input fields failed validation.
    ValidationFailed {
        /// Every violated field, in field order.
        errors: Vec<FieldError>,
    },
    /// Service type string is not a known service.
    InvalidServiceType(String),
    /// Request status string is not a known status.
    InvalidRequestStatus(String),
    /// Offer status string is not a known status.
    InvalidOfferStatus(String),
    /// A status change that the state machine does not allow.
    InvalidStatusTransition {
        /// Which kind of record was being changed.
        entity: &'static str,
        /// The current status.
        from: &'static str,
        /// The requested status.
        to: &'static str,
    },
    /// Service request does not exist.
    RequestNotFound(i64),
    /// Service request does not exist or no longer accepts offers.
    RequestNotOpen(i64),
    /// Offer does not exist.
    OfferNotFound(i64),
    /// A provider tried to bid on their own request.
    SelfOffer {
        /// The request in question.
        request_id: i64,
    },
    /// The provider already has a pending offer on this request.
    DuplicatePendingOffer {
        /// The request in question.
        request_id: i64,
        /// The provider in question.
        provider_id: i64,
    },
    /// The caller does not own the request the offer belongs to.
    NotRequestOwner {
        /// The request in question.
        request_id: i64,
        /// The caller.
        user_id: i64,
    },
    /// The caller is not the provider assigned to the request.
    NotAssignedProvider {
        /// The request in question.
        request_id: i64,
        /// The caller.
        user_id: i64,
    },
    /// The offer is in a status that does not permit the action.
    OfferNotActionable {
        /// The offer in question.
        offer_id: i64,
        /// Its current status.
        status: OfferStatus,
    },
    /// The request must be pending for this action.
    RequestNotPending {
        /// The request in question.
        request_id: i64,
        /// Its current status.
        status: RequestStatus,
    },
    /// The request must be in progress for this action.
    RequestNotInProgress {
        /// The request in question.
        request_id: i64,
        /// Its current status.
        status: RequestStatus,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationFailed { errors } => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Validation failed for: {}", fields.join(", "))
            }
            Self::InvalidServiceType(value) => write!(f, "Invalid service type: '{value}'"),
            Self::InvalidRequestStatus(value) => write!(f, "Invalid request status: '{value}'"),
            Self::InvalidOfferStatus(value) => write!(f, "Invalid offer status: '{value}'"),
            Self::InvalidStatusTransition { entity, from, to } => {
                write!(f, "Cannot move {entity} from '{from}' to '{to}'")
            }
            Self::RequestNotFound(id) => write!(f, "Service request {id} not found"),
            Self::RequestNotOpen(id) => {
                write!(f, "Service request {id} not found or not in a pending state")
            }
            Self::OfferNotFound(id) => write!(f, "Offer {id} not found"),
            Self::SelfOffer { request_id } => {
                write!(
                    f,
                    "Cannot make an offer on your own service request {request_id}"
                )
            }
            Self::DuplicatePendingOffer {
                request_id,
                provider_id,
            } => {
                write!(
                    f,
                    "Provider {provider_id} already has a pending offer on service request {request_id}"
                )
            }
            Self::NotRequestOwner {
                request_id,
                user_id,
            } => {
                write!(
                    f,
                    "User {user_id} does not own service request {request_id}"
                )
            }
            Self::NotAssignedProvider {
                request_id,
                user_id,
            } => {
                write!(
                    f,
                    "User {user_id} is not the provider assigned to service request {request_id}"
                )
            }
            Self::OfferNotActionable { offer_id, status } => {
                write!(f, "Offer {offer_id} is {status} and cannot be changed")
            }
            Self::RequestNotPending { request_id, status } => {
                write!(
                    f,
                    "Service request {request_id} is {status}, expected pending"
                )
            }
            Self::RequestNotInProgress { request_id, status } => {
                write!(
                    f,
                    "Service request {request_id} is {status}, expected in_progress"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
