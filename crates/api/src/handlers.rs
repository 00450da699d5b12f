// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Handlers are synchronous. Each one authorizes the caller's role first,
//! then either runs a single unit of work or a read query. State-changing
//! handlers return the notifications the committed transition produced so
//! the caller can hand them to a delivery sink.

use agri_connect::{Command, Notification, Outcome};
use agri_connect_domain::{
    DomainError, FieldError, NewServiceRequest, OfferStatus, RawInput, RequestStatus,
    ServiceRequestDraft, validate_offer_input, validate_service_request,
};
use agri_connect_persistence::{CommittedTransition, OfferScope, OfferView, Persistence};
use rust_decimal::Decimal;
use time::{OffsetDateTime, UtcOffset};
use tracing::info;

use crate::auth::{AuthenticatedActor, Role};
use crate::capabilities::{AuthorizationService, Operation};
use crate::error::{
    ApiError, VALIDATION_FAILED, translate_domain_error, translate_persistence_error,
    translate_unit_of_work_error,
};
use crate::request_response::{
    AcceptOfferResponse, CompleteRequestResponse, CreateOfferRequest, CreateOfferResponse,
    CreateServiceRequestRequest, CreateServiceRequestResponse, GetOfferResponse,
    ListMyRequestsResponse, ListOffersResponse, ListServiceRequestsResponse, OfferDetail,
    RejectOfferResponse, RequestWithOffersInfo, ServiceRequestInfo, raw_input,
};

/// The result of a state-changing API operation.
///
/// Notifications are only present once the change has committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResult<T> {
    /// The API response.
    pub response: T,
    /// Messages for the delivery sink.
    pub notifications: Vec<Notification>,
}

fn run(
    persistence: &Persistence,
    command: Command,
    now: OffsetDateTime,
) -> Result<CommittedTransition, ApiError> {
    persistence
        .execute(command, now)
        .map_err(translate_unit_of_work_error)
}

fn unexpected_outcome(operation: Operation, outcome: &Outcome) -> ApiError {
    ApiError::Internal {
        message: format!("{} produced unexpected outcome {outcome:?}", operation.name()),
    }
}

fn missing_id(operation: Operation) -> ApiError {
    ApiError::Internal {
        message: format!("{} committed without an inserted id", operation.name()),
    }
}

/// Posts a new service request for the calling farmer.
///
/// # Arguments
///
/// * `persistence` - The storage handle
/// * `request` - The request body
/// * `authenticated_actor` - The caller
/// * `now` - The current time; its UTC date is the earliest allowed `required_date`
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not a farmer
/// - Any field fails validation
/// - The write fails
pub fn create_service_request(
    persistence: &Persistence,
    request: CreateServiceRequestRequest,
    authenticated_actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ApiResult<CreateServiceRequestResponse>, ApiError> {
    AuthorizationService::authorize(authenticated_actor, Operation::CreateServiceRequest)?;

    let draft: ServiceRequestDraft = request.into_draft();
    let today: time::Date = now.to_offset(UtcOffset::UTC).date();
    let validated: NewServiceRequest =
        validate_service_request(draft, today).map_err(translate_domain_error)?;

    let committed: CommittedTransition = run(
        persistence,
        Command::CreateRequest {
            farmer_id: authenticated_actor.user_id,
            request: validated,
        },
        now,
    )?;
    let request_id: i64 = committed
        .inserted_id
        .ok_or_else(|| missing_id(Operation::CreateServiceRequest))?;

    info!(
        request_id,
        farmer_id = authenticated_actor.user_id,
        "Service request created"
    );

    Ok(ApiResult {
        response: CreateServiceRequestResponse {
            message: String::from("Service request created successfully."),
            request_id,
            status: RequestStatus::Pending.as_str().to_string(),
        },
        notifications: committed.notifications,
    })
}

/// Lists every request still open to offers, newest first.
///
/// # Errors
///
/// Returns an error if the caller is not a provider or the query fails.
pub fn list_open_requests(
    persistence: &Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListServiceRequestsResponse, ApiError> {
    AuthorizationService::authorize(authenticated_actor, Operation::ListOpenRequests)?;

    let requests: Vec<ServiceRequestInfo> = persistence
        .list_open_requests()
        .map_err(translate_persistence_error)?
        .iter()
        .map(ServiceRequestInfo::from_domain)
        .collect::<Result<_, _>>()?;

    Ok(ListServiceRequestsResponse {
        message: String::from("Service requests fetched successfully."),
        count: requests.len(),
        requests,
    })
}

/// Lists the calling farmer's requests, each with its offers.
///
/// # Errors
///
/// Returns an error if the caller is not a farmer or the query fails.
pub fn list_my_requests(
    persistence: &Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListMyRequestsResponse, ApiError> {
    AuthorizationService::authorize(authenticated_actor, Operation::ListOwnRequests)?;

    let requests: Vec<RequestWithOffersInfo> = persistence
        .list_requests_for_farmer(authenticated_actor.user_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(RequestWithOffersInfo::from_record)
        .collect::<Result<_, _>>()?;

    Ok(ListMyRequestsResponse {
        message: String::from("My service requests fetched successfully."),
        count: requests.len(),
        requests,
    })
}

/// Marks an in-progress request as completed by its assigned provider.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not a provider
/// - The request does not exist
/// - The caller is not the assigned provider
/// - The request is not in progress
pub fn complete_request(
    persistence: &Persistence,
    request_id: i64,
    authenticated_actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ApiResult<CompleteRequestResponse>, ApiError> {
    AuthorizationService::authorize(authenticated_actor, Operation::CompleteRequest)?;

    let committed: CommittedTransition = run(
        persistence,
        Command::CompleteRequest {
            provider_id: authenticated_actor.user_id,
            request_id,
        },
        now,
    )?;

    match committed.outcome {
        Outcome::RequestCompleted { request_id, .. } => Ok(ApiResult {
            response: CompleteRequestResponse {
                message: String::from("Service request marked as completed successfully!"),
                request_id,
            },
            notifications: committed.notifications,
        }),
        other => Err(unexpected_outcome(Operation::CompleteRequest, &other)),
    }
}

/// An offer body that passed validation.
struct ValidOffer {
    request_id: i64,
    offered_price: Decimal,
    estimated_cost: Decimal,
    notes: Option<String>,
}

/// Checks that an offer body names a request and carries valid terms.
fn validate_offer_request(request: CreateOfferRequest) -> Result<ValidOffer, ApiError> {
    let mut errors: Vec<FieldError> = Vec::new();

    let raw_request_id: Option<RawInput> = raw_input(request.request_id);
    if raw_request_id.is_none() {
        errors.push(FieldError::new(
            "request_id",
            "Please provide request_id, offered_price, and estimated_cost.",
        ));
    }
    let request_id: Option<i64> = raw_request_id.and_then(|value| {
        let id: Option<i64> = value.as_i64();
        if id.is_none() {
            errors.push(FieldError::new(
                "request_id",
                "request_id must be a whole number.",
            ));
        }
        id
    });

    let offered_price: Option<RawInput> = raw_input(request.offered_price);
    let estimated_cost: Option<RawInput> = raw_input(request.estimated_cost);
    let terms: Option<(Decimal, Decimal)> =
        match validate_offer_input(offered_price.as_ref(), estimated_cost.as_ref()) {
            Ok(terms) => Some(terms),
            Err(DomainError::ValidationFailed { errors: term_errors }) => {
                errors.extend(term_errors);
                None
            }
            Err(other) => return Err(translate_domain_error(other)),
        };

    let notes: Option<String> = raw_input(request.notes).and_then(|value| {
        let text: Option<String> = value.into_text();
        if text.is_none() {
            errors.push(FieldError::new("notes", "Notes must be text."));
        }
        text
    });

    match (request_id, terms) {
        (Some(request_id), Some((offered_price, estimated_cost))) if errors.is_empty() => {
            Ok(ValidOffer {
                request_id,
                offered_price,
                estimated_cost,
                notes,
            })
        }
        _ => Err(ApiError::Validation {
            message: String::from(VALIDATION_FAILED),
            errors,
        }),
    }
}

/// Makes an offer on a pending request.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not a provider
/// - `request_id` is missing or not a whole number
/// - A price is missing, not numeric, or not positive
/// - `notes` is present but not a string
/// - The request does not exist or is not pending
/// - The caller owns the request
/// - The caller already has a pending offer on it
pub fn create_offer(
    persistence: &Persistence,
    request: CreateOfferRequest,
    authenticated_actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ApiResult<CreateOfferResponse>, ApiError> {
    AuthorizationService::authorize(authenticated_actor, Operation::CreateOffer)?;

    let offer: ValidOffer = validate_offer_request(request)?;
    let request_id: i64 = offer.request_id;

    let committed: CommittedTransition = run(
        persistence,
        Command::CreateOffer {
            provider_id: authenticated_actor.user_id,
            request_id,
            offered_price: offer.offered_price,
            estimated_cost: offer.estimated_cost,
            notes: offer.notes,
        },
        now,
    )?;
    let offer_id: i64 = committed
        .inserted_id
        .ok_or_else(|| missing_id(Operation::CreateOffer))?;

    info!(
        offer_id,
        request_id,
        provider_id = authenticated_actor.user_id,
        "Offer created"
    );

    Ok(ApiResult {
        response: CreateOfferResponse {
            message: String::from("Offer created successfully."),
            offer_id,
            status: OfferStatus::Pending.as_str().to_string(),
        },
        notifications: committed.notifications,
    })
}

/// Lists the offers visible to the caller.
///
/// Admins see every offer, providers see their own, and farmers see the
/// offers made on their requests.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_offers(
    persistence: &Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListOffersResponse, ApiError> {
    AuthorizationService::authorize(authenticated_actor, Operation::ListOffers)?;

    let scope: OfferScope = match authenticated_actor.role {
        Role::Admin => OfferScope::All,
        Role::ServiceProvider | Role::TractorOwner => {
            OfferScope::ProvidedBy(authenticated_actor.user_id)
        }
        Role::Farmer => OfferScope::RequestedBy(authenticated_actor.user_id),
    };

    let offers: Vec<OfferDetail> = persistence
        .list_offers(scope)
        .map_err(translate_persistence_error)?
        .iter()
        .map(OfferDetail::from_view)
        .collect::<Result<_, _>>()?;

    Ok(ListOffersResponse {
        message: String::from("Offers fetched successfully."),
        count: offers.len(),
        offers,
    })
}

/// Fetches one offer.
///
/// Visible to admins, to the provider who made it and to the farmer who
/// owns the request.
///
/// # Errors
///
/// Returns an error if the offer does not exist or the caller may not see it.
pub fn get_offer(
    persistence: &Persistence,
    offer_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<GetOfferResponse, ApiError> {
    AuthorizationService::authorize(authenticated_actor, Operation::GetOffer)?;

    let view: OfferView = persistence
        .get_offer_view(offer_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::OfferNotFound(offer_id)))?;

    let caller: i64 = authenticated_actor.user_id;
    let visible: bool = authenticated_actor.role == Role::Admin
        || view.offer.provider_id == caller
        || view.farmer_id == caller;
    if !visible {
        return Err(ApiError::Forbidden {
            message: String::from("Unauthorized to view this offer."),
        });
    }

    Ok(GetOfferResponse {
        message: String::from("Offer fetched successfully."),
        offer: OfferDetail::from_view(&view)?,
    })
}

/// Accepts an offer on one of the caller's requests.
///
/// Every other pending offer on the request is rejected in the same
/// transaction and the request moves to in progress.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not a farmer
/// - The offer does not exist
/// - The caller does not own the request
/// - The offer is not pending or the request is not pending
pub fn accept_offer(
    persistence: &Persistence,
    offer_id: i64,
    authenticated_actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ApiResult<AcceptOfferResponse>, ApiError> {
    AuthorizationService::authorize(authenticated_actor, Operation::AcceptOffer)?;

    let committed: CommittedTransition = run(
        persistence,
        Command::AcceptOffer {
            farmer_id: authenticated_actor.user_id,
            offer_id,
        },
        now,
    )?;

    match committed.outcome {
        Outcome::OfferAccepted {
            offer_id,
            request_id,
            rejected_siblings,
        } => {
            info!(
                offer_id,
                request_id,
                rejected = rejected_siblings.len(),
                "Offer accepted"
            );
            Ok(ApiResult {
                response: AcceptOfferResponse {
                    message: String::from(
                        "Offer accepted successfully! Request status updated to in progress.",
                    ),
                    offer_id,
                    request_id,
                },
                notifications: committed.notifications,
            })
        }
        other => Err(unexpected_outcome(Operation::AcceptOffer, &other)),
    }
}

/// Rejects an offer on one of the caller's requests.
///
/// Rejecting the offer a request was assigned to reverts the request to
/// pending.
///
/// # Errors
///
/// Returns an error if:
/// - The caller is not a farmer
/// - The offer does not exist
/// - The caller does not own the request
/// - The offer is already rejected or completed
pub fn reject_offer(
    persistence: &Persistence,
    offer_id: i64,
    authenticated_actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<ApiResult<RejectOfferResponse>, ApiError> {
    AuthorizationService::authorize(authenticated_actor, Operation::RejectOffer)?;

    let committed: CommittedTransition = run(
        persistence,
        Command::RejectOffer {
            farmer_id: authenticated_actor.user_id,
            offer_id,
        },
        now,
    )?;

    match committed.outcome {
        Outcome::OfferRejected {
            offer_id,
            request_reverted,
            ..
        } => {
            let message: &str = if request_reverted {
                "Offer rejected, and service request reverted to pending."
            } else {
                "Offer rejected successfully!"
            };
            Ok(ApiResult {
                response: RejectOfferResponse {
                    message: String::from(message),
                    offer_id,
                    request_reverted,
                },
                notifications: committed.notifications,
            })
        }
        other => Err(unexpected_outcome(Operation::RejectOffer, &other)),
    }
}
