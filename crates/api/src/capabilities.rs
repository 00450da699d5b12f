// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role-based authorization.
//!
//! Every marketplace operation declares the roles permitted to call it.
//! This is checked before any storage access. Entity-level checks (who
//! owns a request, who wrote an offer) happen later, inside the unit of
//! work or the read handler.

use crate::auth::{AuthenticatedActor, Role};
use crate::error::AuthError;

/// A marketplace operation subject to role checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Post a service request.
    CreateServiceRequest,
    /// Browse requests open for bidding.
    ListOpenRequests,
    /// View one's own requests and their offers.
    ListOwnRequests,
    /// Mark an assigned request as done.
    CompleteRequest,
    /// Bid on a request.
    CreateOffer,
    /// List offers visible to the caller.
    ListOffers,
    /// View one offer.
    GetOffer,
    /// Accept an offer.
    AcceptOffer,
    /// Reject an offer.
    RejectOffer,
}

const FARMER_ONLY: &[Role] = &[Role::Farmer];
const PROVIDERS: &[Role] = &[Role::ServiceProvider, Role::TractorOwner];

impl Operation {
    /// Returns the stable name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateServiceRequest => "create_service_request",
            Self::ListOpenRequests => "list_open_requests",
            Self::ListOwnRequests => "list_own_requests",
            Self::CompleteRequest => "complete_request",
            Self::CreateOffer => "create_offer",
            Self::ListOffers => "list_offers",
            Self::GetOffer => "get_offer",
            Self::AcceptOffer => "accept_offer",
            Self::RejectOffer => "reject_offer",
        }
    }

    /// Returns the roles allowed to attempt this operation.
    #[must_use]
    pub const fn permitted_roles(&self) -> &'static [Role] {
        match self {
            Self::CreateServiceRequest
            | Self::ListOwnRequests
            | Self::AcceptOffer
            | Self::RejectOffer => FARMER_ONLY,
            Self::ListOpenRequests | Self::CompleteRequest | Self::CreateOffer => PROVIDERS,
            Self::ListOffers | Self::GetOffer => &Role::ALL,
        }
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that an actor's role may attempt an operation.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `operation` - The operation being attempted
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` naming the roles that would be
    /// accepted.
    pub fn authorize(actor: &AuthenticatedActor, operation: Operation) -> Result<(), AuthError> {
        let permitted: &[Role] = operation.permitted_roles();
        if permitted.contains(&actor.role) {
            return Ok(());
        }

        Err(AuthError::Unauthorized {
            action: operation.name().to_string(),
            required_role: permitted
                .iter()
                .map(Role::as_str)
                .collect::<Vec<&str>>()
                .join(" or "),
        })
    }
}
