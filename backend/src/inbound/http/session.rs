//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: the signed-in identity, the post-login return
//! path and one-shot flash notices.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::ports::LoginService;
use crate::domain::{Error, Identity, UserId, Username};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const USERNAME_KEY: &str = "username";
pub(crate) const RETURN_TO_KEY: &str = "return_to";
pub(crate) const FLASH_KEY: &str = "flash";

/// Notice shown when a guarded page is requested without a session identity.
pub const SIGN_IN_REQUIRED_MESSAGE: &str = "You must be signed in to access this page";

/// Pending one-shot notices, rendered by the next page and then cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default)]
    pub success: Vec<String>,
    #[serde(default)]
    pub error: Vec<String>,
}

impl Flash {
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

fn write_error(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

fn read_error(error: impl std::fmt::Display) -> Error {
    Error::internal(format!("failed to read session: {error}"))
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated identity, renewing the session first.
    ///
    /// Pending flash notices and the stored return path survive the renewal.
    pub fn persist_identity(&self, identity: &Identity) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, identity.user_id().to_string())
            .map_err(write_error)?;
        self.0
            .insert(USERNAME_KEY, identity.username().as_ref())
            .map_err(write_error)
    }

    /// Identity claimed by the cookie, before any check against the store.
    ///
    /// Tampered or partial values are logged and treated as signed out.
    fn claimed_identity(&self) -> Result<Option<Identity>, Error> {
        let id = self.0.get::<String>(USER_ID_KEY).map_err(read_error)?;
        let name = self.0.get::<String>(USERNAME_KEY).map_err(read_error)?;
        let (Some(id), Some(name)) = (id, name) else {
            return Ok(None);
        };
        match (UserId::new(&id), Username::new(&name)) {
            (Ok(user_id), Ok(username)) => Ok(Some(Identity::new(user_id, username))),
            (Err(error), _) | (_, Err(error)) => {
                warn!("invalid identity in session cookie: {error}");
                Ok(None)
            }
        }
    }

    fn forget_identity(&self) {
        self.0.remove(USER_ID_KEY);
        self.0.remove(USERNAME_KEY);
    }

    /// Fetch the signed-in identity as the user store currently knows it.
    ///
    /// A cookie naming an account the store no longer holds is cleared and
    /// treated as signed out.
    pub async fn identity(&self, users: &dyn LoginService) -> Result<Option<Identity>, Error> {
        let Some(claimed) = self.claimed_identity()? else {
            return Ok(None);
        };
        let current = users.find_identity(claimed.user_id()).await?;
        if current.is_none() {
            warn!(user_id = %claimed.user_id(), "session names an unknown user");
            self.forget_identity();
        }
        Ok(current)
    }

    /// Require a signed-in identity.
    ///
    /// On failure the requested path is remembered for the post-login
    /// redirect and `401 Unauthorized` is returned for the route to recover.
    pub async fn require_identity(
        &self,
        users: &dyn LoginService,
        requested_path: &str,
    ) -> Result<Identity, Error> {
        if let Some(identity) = self.identity(users).await? {
            return Ok(identity);
        }
        self.0
            .insert(RETURN_TO_KEY, requested_path)
            .map_err(write_error)?;
        Err(Error::unauthorized(SIGN_IN_REQUIRED_MESSAGE))
    }

    /// Remove and return the remembered post-login destination.
    pub fn take_return_to(&self) -> Result<Option<String>, Error> {
        let path = self.0.get::<String>(RETURN_TO_KEY).map_err(read_error)?;
        self.0.remove(RETURN_TO_KEY);
        Ok(path.filter(|path| path.starts_with('/') && !path.starts_with("//")))
    }

    fn pending_flash(&self) -> Result<Flash, Error> {
        Ok(self
            .0
            .get::<Flash>(FLASH_KEY)
            .map_err(read_error)?
            .unwrap_or_default())
    }

    fn push_flash(&self, push: impl FnOnce(&mut Flash)) -> Result<(), Error> {
        let mut flash = self.pending_flash()?;
        push(&mut flash);
        self.0.insert(FLASH_KEY, flash).map_err(write_error)
    }

    /// Queue a success notice for the next rendered page.
    pub fn flash_success(&self, message: impl Into<String>) -> Result<(), Error> {
        let message = message.into();
        self.push_flash(|flash| flash.success.push(message))
    }

    /// Queue an error notice for the next rendered page.
    pub fn flash_error(&self, message: impl Into<String>) -> Result<(), Error> {
        let message = message.into();
        self.push_flash(|flash| flash.error.push(message))
    }

    /// Drain pending notices.
    pub fn take_flash(&self) -> Result<Flash, Error> {
        let flash = self.pending_flash()?;
        if !flash.is_empty() {
            self.0.remove(FLASH_KEY);
        }
        Ok(flash)
    }

    /// Forget the signed-in identity, keeping any queued notices.
    pub fn logout(&self) {
        self.forget_identity();
        self.0.remove(RETURN_TO_KEY);
        self.0.renew();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
