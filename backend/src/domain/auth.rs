//! Authentication primitives: login credentials and registration requests.
//!
//! Inbound adapters parse raw form fields through these constructors before
//! talking to the account service, so the service only sees validated input.

use zeroize::Zeroizing;

use super::{Email, UserValidationError, Username};

/// Domain error returned when login or registration values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// Username or email failed validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

fn require_password(password: &str) -> Result<Zeroizing<String>, CredentialValidationError> {
    if password.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use campgrounds::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("a", "p").expect("valid credentials");
/// assert_eq!(creds.username().as_ref(), "a");
/// assert_eq!(creds.password(), "p");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: require_password(password)?,
        })
    }

    /// Username used for the account lookup.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plain-text password supplied by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    email: Email,
    username: Username,
    password: Zeroizing<String>,
}

impl Registration {
    /// Construct a registration from raw form inputs.
    pub fn try_from_parts(
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            username: Username::new(username)?,
            password: require_password(password)?,
        })
    }

    /// Contact address for the new account.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Requested login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plain-text password to hash.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
