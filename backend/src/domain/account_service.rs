//! Account service: registration and credential verification.
//!
//! Hashing is CPU-bound, so both operations hand it to Tokio's blocking
//! pool, carrying the request's trace id along.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::port_error_mapping::{map_hash_error, map_user_error};
use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, RegistrationService, UserRepository,
};
use crate::domain::{
    Error, Identity, LoginCredentials, Registration, TraceId, User, UserId,
};

/// Notice shown for an unknown username or a wrong password.
pub const BAD_CREDENTIALS_MESSAGE: &str = "Password or username is incorrect";

/// Account service over a user repository and a password hasher.
pub struct AccountService<U: ?Sized, P: ?Sized> {
    users: Arc<U>,
    hasher: Arc<P>,
}

impl<U: ?Sized, P: ?Sized> AccountService<U, P> {
    /// Create a new service with the given collaborators.
    pub fn new(users: Arc<U>, hasher: Arc<P>) -> Self {
        Self { users, hasher }
    }
}

impl<U, P> AccountService<U, P>
where
    U: UserRepository + ?Sized,
    P: PasswordHasher + ?Sized + 'static,
{
    async fn on_blocking_pool<T, F>(&self, work: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&P) -> Result<T, PasswordHashError> + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(TraceId::bind_blocking(move || work(&*hasher)))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(map_hash_error)
    }
}

#[async_trait]
impl<U, P> LoginService for AccountService<U, P>
where
    U: UserRepository + ?Sized,
    P: PasswordHasher + ?Sized + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Identity, Error> {
        let stored = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(BAD_CREDENTIALS_MESSAGE))?;

        let password = Zeroizing::new(credentials.password().to_owned());
        let hash = stored.password_hash;
        let matches = self
            .on_blocking_pool(move |hasher| hasher.verify(&password, &hash))
            .await?;
        if !matches {
            return Err(Error::unauthorized(BAD_CREDENTIALS_MESSAGE));
        }
        Ok(stored.user.identity())
    }

    async fn find_identity(&self, user_id: &UserId) -> Result<Option<Identity>, Error> {
        let user = self.users.find_by_id(user_id).await.map_err(map_user_error)?;
        Ok(user.as_ref().map(User::identity))
    }
}

#[async_trait]
impl<U, P> RegistrationService for AccountService<U, P>
where
    U: UserRepository + ?Sized,
    P: PasswordHasher + ?Sized + 'static,
{
    async fn register(&self, registration: &Registration) -> Result<Identity, Error> {
        let password = Zeroizing::new(registration.password().to_owned());
        let hash = self
            .on_blocking_pool(move |hasher| hasher.hash(&password))
            .await?;

        let user = User::new(
            UserId::random(),
            registration.email().clone(),
            registration.username().clone(),
        );
        self.users
            .create(&user, &hash)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), "account registered");
        Ok(user.identity())
    }
}
