// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication types and the bearer token authority.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::error::AuthError;

/// Marketplace roles.
///
/// A user holds exactly one role. Providers are the two roles that may bid
/// on and complete service requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Posts service requests and chooses among offers.
    Farmer,
    /// Offers field services.
    ServiceProvider,
    /// Offers field services with their own machinery.
    TractorOwner,
    /// Oversees the marketplace; may read every offer.
    Admin,
}

impl Role {
    /// Every role.
    pub const ALL: [Self; 4] = [
        Self::Farmer,
        Self::ServiceProvider,
        Self::TractorOwner,
        Self::Admin,
    ];

    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::ServiceProvider => "service_provider",
            Self::TractorOwner => "tractor_owner",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: format!("unknown role '{s}'"),
            })
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The caller's user id.
    pub user_id: i64,
    /// The caller's role.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Resolves an opaque credential into an authenticated actor.
///
/// Implementations must be cheap to share across request tasks.
pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the credential is not
    /// valid.
    fn resolve(&self, credential: &str) -> Result<AuthenticatedActor, AuthError>;
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    sub: String,
    role: String,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority").finish_non_exhaustive()
    }
}

impl TokenAuthority {
    /// Creates an authority keyed by a shared secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issues a token for an actor.
    ///
    /// # Arguments
    ///
    /// * `actor` - The identity to encode
    /// * `ttl` - How long the token stays valid
    /// * `now` - The issue time
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry falls outside the representable date
    /// range or the token cannot be signed.
    pub fn issue(
        &self,
        actor: &AuthenticatedActor,
        ttl: Duration,
        now: OffsetDateTime,
    ) -> Result<String, AuthError> {
        let expires_at: OffsetDateTime = now.checked_add(ttl).ok_or_else(|| {
            AuthError::AuthenticationFailed {
                reason: format!("token lifetime of {ttl} is out of range"),
            }
        })?;
        let claims: Claims = Claims {
            sub: actor.user_id.to_string(),
            role: actor.role.as_str().to_string(),
            exp: expires_at.unix_timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            AuthError::AuthenticationFailed {
                reason: format!("token signing failed: {e}"),
            }
        })
    }

    /// Verifies a token and returns the actor it names.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the signature is wrong,
    /// the token has expired, or the claims are malformed.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedActor, AuthError> {
        let claims: Claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                AuthError::AuthenticationFailed {
                    reason: String::from("Invalid or expired token."),
                }
            })?
            .claims;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AuthError::AuthenticationFailed {
                reason: String::from("Invalid or expired token."),
            })?;
        let role: Role = claims.role.parse()?;

        Ok(AuthenticatedActor::new(user_id, role))
    }
}

impl IdentityProvider for TokenAuthority {
    fn resolve(&self, credential: &str) -> Result<AuthenticatedActor, AuthError> {
        self.verify(credential)
    }
}
