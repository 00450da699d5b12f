// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notifications produced by transitions.
//!
//! These are facts for an external delivery sink (SMS, in-app inbox).
//! Delivery happens after commit and never affects the transition.

use agri_connect_domain::ServiceType;

/// The category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A farmer received a new offer.
    OfferReceived,
    /// A provider's offer was accepted.
    OfferAccepted,
    /// A provider's offer was rejected.
    OfferRejected,
    /// A farmer's request was completed.
    RequestCompleted,
}

impl NotificationKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OfferReceived => "offer_received",
            Self::OfferAccepted => "offer_accepted",
            Self::OfferRejected => "offer_rejected",
            Self::RequestCompleted => "request_completed",
        }
    }
}

/// A message for a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The recipient.
    pub user_id: i64,
    /// The category.
    pub kind: NotificationKind,
    /// The text to deliver.
    pub message: String,
    /// The request the notification concerns.
    pub request_id: i64,
}

impl Notification {
    pub(crate) fn offer_received(farmer_id: i64, request_id: i64, service: ServiceType) -> Self {
        Self {
            user_id: farmer_id,
            kind: NotificationKind::OfferReceived,
            message: format!("You have a new offer on your {service} request #{request_id}."),
            request_id,
        }
    }

    pub(crate) fn offer_accepted(provider_id: i64, request_id: i64, service: ServiceType) -> Self {
        Self {
            user_id: provider_id,
            kind: NotificationKind::OfferAccepted,
            message: format!("Your offer on {service} request #{request_id} was accepted."),
            request_id,
        }
    }

    pub(crate) fn offer_rejected(provider_id: i64, request_id: i64, service: ServiceType) -> Self {
        Self {
            user_id: provider_id,
            kind: NotificationKind::OfferRejected,
            message: format!("Your offer on {service} request #{request_id} was not accepted."),
            request_id,
        }
    }

    pub(crate) fn request_completed(farmer_id: i64, request_id: i64, service: ServiceType) -> Self {
        Self {
            user_id: farmer_id,
            kind: NotificationKind::RequestCompleted,
            message: format!("Your {service} request #{request_id} has been marked completed."),
            request_id,
        }
    }
}
