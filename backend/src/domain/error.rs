//! Failures the domain reports to its callers.
//!
//! Nothing here knows about HTTP. The web adapter decides whether an
//! [`Error`] becomes a flash notice plus redirect or a rendered error page.

use serde_json::Value;

use super::TraceId;

/// Failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Form input failed validation.
    InvalidRequest,
    /// Nobody is signed in.
    Unauthorized,
    /// Signed in, but not the author of the listing or review.
    Forbidden,
    NotFound,
    /// Username or email already taken.
    Conflict,
    /// Mapbox or Cloudinary failed, or a location could not be resolved.
    UpstreamFailure,
    /// The database is unreachable.
    ServiceUnavailable,
    InternalError,
}

impl ErrorCode {
    /// Label used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::UpstreamFailure => "upstream_failure",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

/// A categorised, displayable failure.
///
/// Built inside a request, it remembers that request's [`TraceId`] so the
/// error page can show it.
///
/// # Examples
/// ```
/// use campgrounds::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Cannot find that campground!");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.to_string(), "Cannot find that campground!");
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Stands in for a blank message so every error page says something.
const BLANK_MESSAGE_FALLBACK: &str = "Something went wrong";

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            BLANK_MESSAGE_FALLBACK.clone_into(&mut message);
        }
        Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Id of the request this error was raised in.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Machine-readable context, such as the failing form fields.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    #[must_use]
    pub fn with_details(self, details: Value) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }
}

macro_rules! shorthand_constructors {
    ($($name:ident => $code:ident),+ $(,)?) => {
        impl Error {
            $(
                #[doc = concat!("An [`ErrorCode::", stringify!($code), "`] error.")]
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorCode::$code, message)
                }
            )+
        }
    };
}

shorthand_constructors! {
    invalid_request => InvalidRequest,
    unauthorized => Unauthorized,
    forbidden => Forbidden,
    not_found => NotFound,
    conflict => Conflict,
    upstream_failure => UpstreamFailure,
    service_unavailable => ServiceUnavailable,
    internal => InternalError,
}
