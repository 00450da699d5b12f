// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::notification::Notification;
use agri_connect_domain::{
    NewServiceRequest, Offer, OfferStatus, RequestStatus, ServiceRequest,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// A service request together with every offer made on it.
///
/// This is the unit the transition engine reasons over. Every mutating
/// command reads and writes exactly one aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestAggregate {
    /// The request.
    pub request: ServiceRequest,
    /// All offers on the request, in any order.
    pub offers: Vec<Offer>,
}

impl RequestAggregate {
    /// Creates an aggregate from a request and its offers.
    #[must_use]
    pub const fn new(request: ServiceRequest, offers: Vec<Offer>) -> Self {
        Self { request, offers }
    }

    /// Finds an offer by id.
    #[must_use]
    pub fn offer(&self, offer_id: i64) -> Option<&Offer> {
        self.offers.iter().find(|offer| offer.offer_id == offer_id)
    }

    /// Finds the provider's pending offer, if any.
    #[must_use]
    pub fn pending_offer_from(&self, provider_id: i64) -> Option<&Offer> {
        self.offers
            .iter()
            .find(|offer| offer.provider_id == provider_id && offer.status == OfferStatus::Pending)
    }

    /// Returns the projection of this aggregate after `effects` are applied.
    ///
    /// Only update effects change the projection; inserts have no id yet.
    #[must_use]
    pub fn with_effects(&self, effects: &[Effect]) -> Self {
        let mut next: Self = self.clone();
        for effect in effects {
            match effect {
                Effect::SetOfferStatus { offer_id, status } => {
                    if let Some(offer) = next.offers.iter_mut().find(|o| o.offer_id == *offer_id) {
                        offer.status = *status;
                    }
                }
                Effect::SetRequestState(state) if state.request_id == next.request.request_id => {
                    next.request.status = state.status;
                    next.request.accepted_offer_id = state.accepted_offer_id;
                    next.request.service_provider_id = state.service_provider_id;
                    next.request.completed_at = state.completed_at;
                }
                Effect::SetRequestState(_) | Effect::InsertRequest { .. } | Effect::InsertOffer(_) => {}
            }
        }
        next
    }

    /// Checks the structural invariants that must hold between a request
    /// and its offers.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvariantViolation` describing the first broken rule.
    pub fn validate_invariants(&self) -> Result<(), CoreError> {
        let request: &ServiceRequest = &self.request;
        let assigned: bool = matches!(
            request.status,
            RequestStatus::InProgress | RequestStatus::Completed
        );

        if request.accepted_offer_id.is_some() != assigned
            || request.service_provider_id.is_some() != assigned
        {
            return Err(violation(format!(
                "request {} is {} but assignment fields disagree",
                request.request_id, request.status
            )));
        }

        if request.completed_at.is_some() != (request.status == RequestStatus::Completed) {
            return Err(violation(format!(
                "request {} is {} but completed_at disagrees",
                request.request_id, request.status
            )));
        }

        let chosen: Vec<&Offer> = self
            .offers
            .iter()
            .filter(|o| matches!(o.status, OfferStatus::Accepted | OfferStatus::Completed))
            .collect();
        if chosen.len() > 1 {
            return Err(violation(format!(
                "request {} has {} accepted or completed offers",
                request.request_id,
                chosen.len()
            )));
        }

        if let Some(accepted_offer_id) = request.accepted_offer_id {
            let expected: OfferStatus = if request.status == RequestStatus::Completed {
                OfferStatus::Completed
            } else {
                OfferStatus::Accepted
            };
            let consistent: bool = self.offer(accepted_offer_id).is_some_and(|offer| {
                offer.status == expected && Some(offer.provider_id) == request.service_provider_id
            });
            if !consistent {
                return Err(violation(format!(
                    "request {} points at offer {accepted_offer_id} which is not its {expected} offer",
                    request.request_id
                )));
            }
            if self
                .offers
                .iter()
                .any(|o| o.offer_id != accepted_offer_id && o.status != OfferStatus::Rejected)
            {
                return Err(violation(format!(
                    "request {} is {} but has unrejected sibling offers",
                    request.request_id, request.status
                )));
            }
        } else if !chosen.is_empty() {
            return Err(violation(format!(
                "request {} is pending but has an accepted offer",
                request.request_id
            )));
        }

        for offer in &self.offers {
            if offer.provider_id == request.farmer_id {
                return Err(violation(format!(
                    "offer {} was made by the request owner",
                    offer.offer_id
                )));
            }
            let pending_from_provider: usize = self
                .offers
                .iter()
                .filter(|o| o.provider_id == offer.provider_id && o.status == OfferStatus::Pending)
                .count();
            if pending_from_provider > 1 {
                return Err(violation(format!(
                    "provider {} has {pending_from_provider} pending offers on request {}",
                    offer.provider_id, request.request_id
                )));
            }
        }

        Ok(())
    }
}

fn violation(message: String) -> CoreError {
    CoreError::InvariantViolation(message)
}

/// An offer that has been validated but not stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOffer {
    /// The request being bid on.
    pub request_id: i64,
    /// The provider making the offer.
    pub provider_id: i64,
    /// The price the provider will charge.
    pub offered_price: Decimal,
    /// The provider's estimate of their own cost.
    pub estimated_cost: Decimal,
    /// Optional notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: OffsetDateTime,
}

/// The full mutable state of a request after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestState {
    /// The request being updated.
    pub request_id: i64,
    /// New status.
    pub status: RequestStatus,
    /// New accepted offer, or none.
    pub accepted_offer_id: Option<i64>,
    /// New assigned provider, or none.
    pub service_provider_id: Option<i64>,
    /// New completion time, or none.
    pub completed_at: Option<OffsetDateTime>,
}

/// A single write the storage layer must perform to realise a transition.
///
/// Effects are applied in order inside one transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Insert a new pending service request.
    InsertRequest {
        /// The owning farmer.
        farmer_id: i64,
        /// The validated request body.
        request: NewServiceRequest,
        /// Creation time.
        created_at: OffsetDateTime,
    },
    /// Insert a new pending offer.
    InsertOffer(NewOffer),
    /// Change an offer's status.
    SetOfferStatus {
        /// The offer to update.
        offer_id: i64,
        /// Its new status.
        status: OfferStatus,
    },
    /// Overwrite a request's status and assignment fields.
    SetRequestState(RequestState),
}

/// What a successful transition did, for building responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A request was created; its id is assigned on insert.
    RequestCreated,
    /// An offer was created; its id is assigned on insert.
    OfferCreated {
        /// The request the offer is on.
        request_id: i64,
    },
    /// An offer was accepted.
    OfferAccepted {
        /// The accepted offer.
        offer_id: i64,
        /// Its request, now in progress.
        request_id: i64,
        /// Sibling offers implicitly rejected.
        rejected_siblings: Vec<i64>,
    },
    /// An offer was rejected.
    OfferRejected {
        /// The rejected offer.
        offer_id: i64,
        /// Its request.
        request_id: i64,
        /// True if the request went back to pending.
        request_reverted: bool,
    },
    /// A request was completed.
    RequestCompleted {
        /// The completed request.
        request_id: i64,
        /// The offer moved to completed, if one was recorded.
        completed_offer_id: Option<i64>,
    },
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// Writes to perform, in order.
    pub effects: Vec<Effect>,
    /// Notifications to hand to the delivery sink after commit.
    pub notifications: Vec<Notification>,
    /// Summary of what happened.
    pub outcome: Outcome,
}
