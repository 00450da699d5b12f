// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use agri_connect::CoreError;
use agri_connect_domain::{DomainError, FieldError};
use agri_connect_persistence::{PersistenceError, UnitOfWorkError};

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API
/// contract. The `Display` text of every variant except `Internal` is safe
/// to show to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// One or more input fields are invalid.
    #[error("{message}")]
    Validation {
        /// A summary of the failure.
        message: String,
        /// Every violated field.
        errors: Vec<FieldError>,
    },
    /// The caller could not be identified.
    #[error("{reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The caller may not perform this action.
    #[error("{message}")]
    Forbidden {
        /// A human-readable description.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{message}")]
    NotFound {
        /// A human-readable description.
        message: String,
    },
    /// The action conflicts with existing data.
    #[error("{message}")]
    Conflict {
        /// A human-readable description.
        message: String,
    },
    /// The resource is not in a state that allows the action.
    #[error("{message}")]
    InvalidState {
        /// A human-readable description.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error. Never shown to callers.
        message: String,
    },
}

/// Summary message for every validation failure.
pub const VALIDATION_FAILED: &str = "Validation failed. Please check your inputs.";

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Forbidden {
                message: format!("Access denied. '{action}' requires the {required_role} role."),
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::ValidationFailed { errors } => ApiError::Validation {
            message: String::from(VALIDATION_FAILED),
            errors,
        },
        DomainError::InvalidServiceType(_) => ApiError::Validation {
            message: String::from(VALIDATION_FAILED),
            errors: vec![FieldError::new("service_type", &err.to_string())],
        },
        DomainError::InvalidRequestStatus(_)
        | DomainError::InvalidOfferStatus(_)
        | DomainError::InvalidStatusTransition { .. } => ApiError::InvalidState {
            message: err.to_string(),
        },
        DomainError::RequestNotFound(_) => ApiError::NotFound {
            message: String::from("Service request not found."),
        },
        DomainError::RequestNotOpen(_) => ApiError::NotFound {
            message: String::from(
                "Service request not found or not in a pending state. Cannot make an offer.",
            ),
        },
        DomainError::OfferNotFound(_) => ApiError::NotFound {
            message: String::from("Offer not found."),
        },
        DomainError::SelfOffer { .. } => ApiError::Forbidden {
            message: String::from("You cannot make an offer on your own service request."),
        },
        DomainError::DuplicatePendingOffer { .. } => ApiError::Conflict {
            message: String::from("You have already made a pending offer for this service request."),
        },
        DomainError::NotRequestOwner { .. } => ApiError::Forbidden {
            message: String::from("You are not authorized to manage offers for this request."),
        },
        DomainError::NotAssignedProvider { .. } => ApiError::Forbidden {
            message: String::from(
                "You are not authorized to mark this request as completed. You are not the assigned service provider.",
            ),
        },
        DomainError::OfferNotActionable { status, .. } => ApiError::InvalidState {
            message: format!("Offer is {status} and cannot be accepted or rejected."),
        },
        DomainError::RequestNotPending { status, .. } => ApiError::InvalidState {
            message: format!(
                "Service request is no longer pending (current status: {status}). Cannot accept offer."
            ),
        },
        DomainError::RequestNotInProgress { status, .. } => ApiError::InvalidState {
            message: format!(
                "Cannot mark a request as completed unless it is in progress (current status: {status})."
            ),
        },
    }
}

/// Translates a core error into an API error.
///
/// An invariant violation means the engine produced an inconsistent result;
/// that is an internal fault, not a caller mistake.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::InvariantViolation(msg) => ApiError::Internal {
            message: format!("Invariant violation: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::ConstraintViolation(_) => ApiError::Conflict {
            message: String::from("The change conflicts with existing data."),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

/// Translates a unit-of-work failure into an API error.
#[must_use]
pub fn translate_unit_of_work_error(err: UnitOfWorkError) -> ApiError {
    match err {
        UnitOfWorkError::Rejected(core_err) => translate_core_error(core_err),
        UnitOfWorkError::Storage(persistence_err) => translate_persistence_error(persistence_err),
    }
}
