// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// The kind of field work a farmer is requesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// Ploughing a field.
    Ploughing,
    /// Harvesting a crop.
    Harvesting,
    /// Spraying a crop.
    Spraying,
    /// Any other service.
    Other,
}

impl ServiceType {
    /// All service types, in display order.
    pub const ALL: [Self; 4] = [
        Self::Ploughing,
        Self::Harvesting,
        Self::Spraying,
        Self::Other,
    ];

    /// Returns the string representation of the service type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ploughing => "ploughing",
            Self::Harvesting => "harvesting",
            Self::Spraying => "spraying",
            Self::Other => "other",
        }
    }
}

impl FromStr for ServiceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|service_type| service_type.as_str() == s)
            .ok_or_else(|| DomainError::InvalidServiceType(s.to_string()))
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a service request.
///
/// `Pending -> InProgress -> Completed`, with the single reversal edge
/// `InProgress -> Pending` taken when the accepted offer is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Open for offers.
    Pending,
    /// An offer has been accepted and the work is assigned.
    InProgress,
    /// The assigned provider has finished the work.
    Completed,
}

impl RequestStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Checks whether moving from this status to `next` is a legal edge.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Completed | Self::Pending)
        )
    }

    /// Validates a transition from this status to `next`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the edge does not exist.
    pub fn validate_transition(&self, next: Self) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            return Ok(());
        }
        Err(DomainError::InvalidStatusTransition {
            entity: "service request",
            from: self.as_str(),
            to: next.as_str(),
        })
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidRequestStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Awaiting a decision from the farmer.
    Pending,
    /// Chosen by the farmer; the request is in progress.
    Accepted,
    /// Declined, either explicitly or because a sibling was accepted.
    Rejected,
    /// The work behind this offer has been completed.
    Completed,
}

impl OfferStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    /// Returns true if this status cannot change any more.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Checks whether moving from this status to `next` is a legal edge.
    ///
    /// `Accepted -> Rejected` only happens through the reversal path.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted | Self::Rejected)
                | (Self::Accepted, Self::Rejected | Self::Completed)
        )
    }

    /// Validates a transition from this status to `next`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the edge does not exist.
    pub fn validate_transition(&self, next: Self) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            return Ok(());
        }
        Err(DomainError::InvalidStatusTransition {
            entity: "offer",
            from: self.as_str(),
            to: next.as_str(),
        })
    }
}

impl FromStr for OfferStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidOfferStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional field coordinates attached to a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Longitude in degrees.
    pub lon: Option<f64>,
}

impl Location {
    /// Creates a location from optional coordinates.
    #[must_use]
    pub const fn new(lat: Option<f64>, lon: Option<f64>) -> Self {
        Self { lat, lon }
    }

    /// Returns both coordinates when the location is fully specified.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// A validated service request that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewServiceRequest {
    /// The requested service.
    pub service_type: ServiceType,
    /// Free-form description.
    pub description: Option<String>,
    /// Where the work is needed.
    pub location: Location,
    /// The day the work is needed.
    pub required_date: Date,
    /// The farmer's budget, if given.
    pub budget: Option<Decimal>,
}

/// A stored service request.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    /// The request identifier.
    pub request_id: i64,
    /// The owning farmer.
    pub farmer_id: i64,
    /// The requested service.
    pub service_type: ServiceType,
    /// Free-form description.
    pub description: Option<String>,
    /// Where the work is needed.
    pub location: Location,
    /// The day the work is needed.
    pub required_date: Date,
    /// The farmer's budget, if given.
    pub budget: Option<Decimal>,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// The accepted offer, set while in progress or completed.
    pub accepted_offer_id: Option<i64>,
    /// The assigned provider, set while in progress or completed.
    pub service_provider_id: Option<i64>,
    /// When the assigned provider completed the work.
    pub completed_at: Option<OffsetDateTime>,
    /// When the request was created.
    pub created_at: OffsetDateTime,
}

impl ServiceRequest {
    /// Returns true if the given user owns this request.
    #[must_use]
    pub const fn is_owned_by(&self, user_id: i64) -> bool {
        self.farmer_id == user_id
    }

    /// Returns true if the given user is the assigned provider.
    #[must_use]
    pub fn is_assigned_to(&self, user_id: i64) -> bool {
        self.service_provider_id == Some(user_id)
    }
}

/// A stored offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// The offer identifier.
    pub offer_id: i64,
    /// The request this offer bids on.
    pub request_id: i64,
    /// The provider who made the offer.
    pub provider_id: i64,
    /// The price the provider will charge.
    pub offered_price: Decimal,
    /// The provider's estimate of their own cost.
    pub estimated_cost: Decimal,
    /// Optional notes from the provider.
    pub notes: Option<String>,
    /// Current lifecycle status.
    pub status: OfferStatus,
    /// When the offer was created.
    pub created_at: OffsetDateTime,
}
