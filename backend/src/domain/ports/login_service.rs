//! Driving ports for account use-cases.
//!
//! In hexagonal terms these are *driving* ports: inbound adapters call them
//! to register and authenticate without knowing the backing persistence or
//! hashing scheme, so handler tests can substitute a test double.

use async_trait::async_trait;

use crate::domain::{Error, Identity, LoginCredentials, Registration, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated identity.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Identity, Error>;

    /// Look up the current identity of a signed-in user.
    ///
    /// `None` means the account no longer exists and the session is stale.
    async fn find_identity(&self, user_id: &UserId) -> Result<Option<Identity>, Error>;
}

/// Domain use-case port for account creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create an account and return the identity to sign in as.
    async fn register(&self, registration: &Registration) -> Result<Identity, Error>;
}
