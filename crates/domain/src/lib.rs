// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod error;
mod geo;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::{DomainError, FieldError};
pub use geo::{EARTH_RADIUS_KM, distance_km, is_within_radius};
pub use types::{
    Location, NewServiceRequest, Offer, OfferStatus, RequestStatus, ServiceRequest, ServiceType,
};
pub use validation::{
    RawInput, ServiceRequestDraft, parse_required_date, validate_offer_input, validate_offer_terms,
    validate_service_request,
};
