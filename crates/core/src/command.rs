// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use agri_connect_domain::NewServiceRequest;
use rust_decimal::Decimal;

/// A command represents user intent as data only.
///
/// Commands are the only way to request state changes. Each carries the
/// identity of the caller it acts on behalf of.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Post a new service request.
    CreateRequest {
        /// The farmer posting the request.
        farmer_id: i64,
        /// The validated request body.
        request: NewServiceRequest,
    },
    /// Bid on a pending service request.
    CreateOffer {
        /// The provider making the offer.
        provider_id: i64,
        /// The request being bid on.
        request_id: i64,
        /// The price the provider will charge.
        offered_price: Decimal,
        /// The provider's estimate of their own cost.
        estimated_cost: Decimal,
        /// Optional notes for the farmer.
        notes: Option<String>,
    },
    /// Accept an offer on one of the caller's requests.
    AcceptOffer {
        /// The farmer accepting.
        farmer_id: i64,
        /// The offer to accept.
        offer_id: i64,
    },
    /// Reject an offer on one of the caller's requests.
    RejectOffer {
        /// The farmer rejecting.
        farmer_id: i64,
        /// The offer to reject.
        offer_id: i64,
    },
    /// Mark an in-progress request as completed.
    CompleteRequest {
        /// The assigned provider.
        provider_id: i64,
        /// The request being completed.
        request_id: i64,
    },
}

/// Identifies which request aggregate a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKey {
    /// The command creates a new aggregate.
    New,
    /// The aggregate is addressed by request id.
    Request(i64),
    /// The aggregate is the one containing this offer.
    Offer(i64),
}

impl Command {
    /// Returns the key used to load the aggregate this command applies to.
    #[must_use]
    pub const fn aggregate_key(&self) -> AggregateKey {
        match self {
            Self::CreateRequest { .. } => AggregateKey::New,
            Self::CreateOffer { request_id, .. } | Self::CompleteRequest { request_id, .. } => {
                AggregateKey::Request(*request_id)
            }
            Self::AcceptOffer { offer_id, .. } | Self::RejectOffer { offer_id, .. } => {
                AggregateKey::Offer(*offer_id)
            }
        }
    }

    /// Returns a stable name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateRequest { .. } => "create_request",
            Self::CreateOffer { .. } => "create_offer",
            Self::AcceptOffer { .. } => "accept_offer",
            Self::RejectOffer { .. } => "reject_offer",
            Self::CompleteRequest { .. } => "complete_request",
        }
    }
}
