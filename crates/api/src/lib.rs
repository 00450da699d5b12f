// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the `AgriConnect` marketplace.
//!
//! This crate sits between transport and storage. It resolves callers,
//! checks their role against each operation, turns request bodies into
//! validated commands and translates every lower-layer error into an
//! [`ApiError`] whose message is safe to return.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, IdentityProvider, Role, TokenAuthority};
pub use capabilities::{AuthorizationService, Operation};
pub use error::{
    ApiError, AuthError, VALIDATION_FAILED, translate_core_error, translate_domain_error,
    translate_persistence_error, translate_unit_of_work_error,
};
pub use handlers::{
    ApiResult, accept_offer, complete_request, create_offer, create_service_request, get_offer,
    list_my_requests, list_offers, list_open_requests, reject_offer,
};
pub use request_response::{
    AcceptOfferResponse, CompleteRequestResponse, CreateOfferRequest, CreateOfferResponse,
    CreateServiceRequestRequest, CreateServiceRequestResponse, GetOfferResponse,
    ListMyRequestsResponse, ListOffersResponse, ListServiceRequestsResponse, OfferDetail,
    OfferInfo, RejectOfferResponse, RequestWithOffersInfo, ServiceRequestInfo,
};
