// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::notification::Notification;
use crate::state::{Effect, NewOffer, Outcome, RequestAggregate, RequestState, TransitionResult};
use agri_connect_domain::{
    DomainError, NewServiceRequest, Offer, OfferStatus, RequestStatus, validate_offer_terms,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// Applies a command to a request aggregate, producing the writes and
/// notifications that realise it.
///
/// This function is pure: it never touches storage. The caller is
/// responsible for loading `aggregate` and applying the returned effects
/// inside a single transaction.
///
/// # Arguments
///
/// * `aggregate` - The aggregate addressed by `command.aggregate_key()`,
///   or `None` if it does not exist (always `None` for `CreateRequest`)
/// * `command` - The command to apply
/// * `now` - The transaction timestamp
///
/// # Returns
///
/// * `Ok(TransitionResult)` describing the effects, notifications and outcome
/// * `Err(CoreError)` if the command violates a rule
///
/// # Errors
///
/// Returns an error if:
/// - The addressed request or offer does not exist
/// - The caller does not own or is not assigned to the request
/// - The request or offer is in a status that does not permit the command
/// - A duplicate pending offer or a self-offer is attempted
/// - The resulting aggregate would break a structural invariant
pub fn apply(
    aggregate: Option<&RequestAggregate>,
    command: Command,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::CreateRequest { farmer_id, request } => {
            Ok(create_request(farmer_id, request, now))
        }
        Command::CreateOffer {
            provider_id,
            request_id,
            offered_price,
            estimated_cost,
            notes,
        } => create_offer(
            aggregate,
            NewOffer {
                request_id,
                provider_id,
                offered_price,
                estimated_cost,
                notes,
                created_at: now,
            },
        ),
        Command::AcceptOffer {
            farmer_id,
            offer_id,
        } => accept_offer(aggregate, farmer_id, offer_id),
        Command::RejectOffer {
            farmer_id,
            offer_id,
        } => reject_offer(aggregate, farmer_id, offer_id),
        Command::CompleteRequest {
            provider_id,
            request_id,
        } => complete_request(aggregate, provider_id, request_id, now),
    }
}

fn create_request(
    farmer_id: i64,
    request: NewServiceRequest,
    now: OffsetDateTime,
) -> TransitionResult {
    TransitionResult {
        effects: vec![Effect::InsertRequest {
            farmer_id,
            request,
            created_at: now,
        }],
        notifications: Vec::new(),
        outcome: Outcome::RequestCreated,
    }
}

fn create_offer(
    aggregate: Option<&RequestAggregate>,
    offer: NewOffer,
) -> Result<TransitionResult, CoreError> {
    let _: (Decimal, Decimal) =
        validate_offer_terms(Some(offer.offered_price), Some(offer.estimated_cost))?;

    let aggregate: &RequestAggregate = aggregate
        .filter(|a| {
            a.request.request_id == offer.request_id && a.request.status == RequestStatus::Pending
        })
        .ok_or(DomainError::RequestNotOpen(offer.request_id))?;

    if aggregate.request.is_owned_by(offer.provider_id) {
        return Err(DomainError::SelfOffer {
            request_id: offer.request_id,
        }
        .into());
    }

    if aggregate.pending_offer_from(offer.provider_id).is_some() {
        return Err(DomainError::DuplicatePendingOffer {
            request_id: offer.request_id,
            provider_id: offer.provider_id,
        }
        .into());
    }

    let request_id: i64 = offer.request_id;
    let notification: Notification = Notification::offer_received(
        aggregate.request.farmer_id,
        request_id,
        aggregate.request.service_type,
    );

    Ok(TransitionResult {
        effects: vec![Effect::InsertOffer(offer)],
        notifications: vec![notification],
        outcome: Outcome::OfferCreated { request_id },
    })
}

/// Resolves the offer addressed by a farmer action and checks ownership.
fn owned_offer(
    aggregate: Option<&RequestAggregate>,
    farmer_id: i64,
    offer_id: i64,
) -> Result<(&RequestAggregate, &Offer), CoreError> {
    let aggregate: &RequestAggregate = aggregate.ok_or(DomainError::OfferNotFound(offer_id))?;
    let offer: &Offer = aggregate
        .offer(offer_id)
        .ok_or(DomainError::OfferNotFound(offer_id))?;

    if !aggregate.request.is_owned_by(farmer_id) {
        return Err(DomainError::NotRequestOwner {
            request_id: aggregate.request.request_id,
            user_id: farmer_id,
        }
        .into());
    }

    Ok((aggregate, offer))
}

fn accept_offer(
    aggregate: Option<&RequestAggregate>,
    farmer_id: i64,
    offer_id: i64,
) -> Result<TransitionResult, CoreError> {
    let (aggregate, offer) = owned_offer(aggregate, farmer_id, offer_id)?;
    let request_id: i64 = aggregate.request.request_id;
    let service = aggregate.request.service_type;

    if offer.status != OfferStatus::Pending {
        return Err(DomainError::OfferNotActionable {
            offer_id,
            status: offer.status,
        }
        .into());
    }
    if aggregate.request.status != RequestStatus::Pending {
        return Err(DomainError::RequestNotPending {
            request_id,
            status: aggregate.request.status,
        }
        .into());
    }
    aggregate
        .request
        .status
        .validate_transition(RequestStatus::InProgress)?;

    let mut effects: Vec<Effect> = vec![
        Effect::SetOfferStatus {
            offer_id,
            status: OfferStatus::Accepted,
        },
        Effect::SetRequestState(RequestState {
            request_id,
            status: RequestStatus::InProgress,
            accepted_offer_id: Some(offer_id),
            service_provider_id: Some(offer.provider_id),
            completed_at: None,
        }),
    ];
    let mut notifications: Vec<Notification> =
        vec![Notification::offer_accepted(offer.provider_id, request_id, service)];
    let mut rejected_siblings: Vec<i64> = Vec::new();

    for sibling in aggregate
        .offers
        .iter()
        .filter(|o| o.offer_id != offer_id && o.status == OfferStatus::Pending)
    {
        effects.push(Effect::SetOfferStatus {
            offer_id: sibling.offer_id,
            status: OfferStatus::Rejected,
        });
        notifications.push(Notification::offer_rejected(
            sibling.provider_id,
            request_id,
            service,
        ));
        rejected_siblings.push(sibling.offer_id);
    }

    finish(
        aggregate,
        effects,
        notifications,
        Outcome::OfferAccepted {
            offer_id,
            request_id,
            rejected_siblings,
        },
    )
}

fn reject_offer(
    aggregate: Option<&RequestAggregate>,
    farmer_id: i64,
    offer_id: i64,
) -> Result<TransitionResult, CoreError> {
    let (aggregate, offer) = owned_offer(aggregate, farmer_id, offer_id)?;
    let request_id: i64 = aggregate.request.request_id;

    let is_current_assignment: bool = offer.status == OfferStatus::Accepted
        && aggregate.request.accepted_offer_id == Some(offer_id)
        && aggregate.request.status == RequestStatus::InProgress;

    if offer.status != OfferStatus::Pending && !is_current_assignment {
        return Err(DomainError::OfferNotActionable {
            offer_id,
            status: offer.status,
        }
        .into());
    }
    offer.status.validate_transition(OfferStatus::Rejected)?;

    let mut effects: Vec<Effect> = vec![Effect::SetOfferStatus {
        offer_id,
        status: OfferStatus::Rejected,
    }];

    if is_current_assignment {
        aggregate
            .request
            .status
            .validate_transition(RequestStatus::Pending)?;
        effects.push(Effect::SetRequestState(RequestState {
            request_id,
            status: RequestStatus::Pending,
            accepted_offer_id: None,
            service_provider_id: None,
            completed_at: None,
        }));
    }

    finish(
        aggregate,
        effects,
        vec![Notification::offer_rejected(
            offer.provider_id,
            request_id,
            aggregate.request.service_type,
        )],
        Outcome::OfferRejected {
            offer_id,
            request_id,
            request_reverted: is_current_assignment,
        },
    )
}

fn complete_request(
    aggregate: Option<&RequestAggregate>,
    provider_id: i64,
    request_id: i64,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let aggregate: &RequestAggregate = aggregate
        .filter(|a| a.request.request_id == request_id)
        .ok_or(DomainError::RequestNotFound(request_id))?;
    let request = &aggregate.request;

    if request.status != RequestStatus::InProgress {
        return Err(DomainError::RequestNotInProgress {
            request_id,
            status: request.status,
        }
        .into());
    }
    if !request.is_assigned_to(provider_id) {
        return Err(DomainError::NotAssignedProvider {
            request_id,
            user_id: provider_id,
        }
        .into());
    }
    request.status.validate_transition(RequestStatus::Completed)?;

    let mut effects: Vec<Effect> = vec![Effect::SetRequestState(RequestState {
        request_id,
        status: RequestStatus::Completed,
        accepted_offer_id: request.accepted_offer_id,
        service_provider_id: request.service_provider_id,
        completed_at: Some(now),
    })];

    if let Some(accepted) = request
        .accepted_offer_id
        .and_then(|offer_id| aggregate.offer(offer_id))
    {
        accepted.status.validate_transition(OfferStatus::Completed)?;
        effects.push(Effect::SetOfferStatus {
            offer_id: accepted.offer_id,
            status: OfferStatus::Completed,
        });
    }

    finish(
        aggregate,
        effects,
        vec![Notification::request_completed(
            request.farmer_id,
            request_id,
            request.service_type,
        )],
        Outcome::RequestCompleted {
            request_id,
            completed_offer_id: request.accepted_offer_id,
        },
    )
}

/// Checks the projected aggregate before handing the effects back.
fn finish(
    aggregate: &RequestAggregate,
    effects: Vec<Effect>,
    notifications: Vec<Notification>,
    outcome: Outcome,
) -> Result<TransitionResult, CoreError> {
    aggregate.with_effects(&effects).validate_invariants()?;
    Ok(TransitionResult {
        effects,
        notifications,
        outcome,
    })
}
