//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while rendering every
//! unrecovered failure through one error page. Handlers recover the
//! redirect-worthy outcomes (see [`recover`]) and let the rest propagate here.

use actix_web::http::header::{ContentType, LOCATION};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::{error, warn};

use crate::domain::{ApiResult, Error, ErrorCode, TRACE_ID_HEADER};

use super::session::SessionContext;
use super::views;

/// Message shown when a failure carries nothing safe to display.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong!";
/// Message for requests that match no route.
pub const PAGE_NOT_FOUND_MESSAGE: &str = "Page not found";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::UpstreamFailure => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn display_message(error: &Error) -> &str {
    if matches!(error.code(), ErrorCode::InternalError) || error.message().trim().is_empty() {
        DEFAULT_ERROR_MESSAGE
    } else {
        error.message()
    }
}

#[derive(Serialize)]
struct ErrorPage<'a> {
    status: u16,
    message: &'a str,
    trace_id: Option<&'a str>,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                code = self.code().as_str(),
                message = self.message(),
                trace_id = self.trace_id(),
                "request failed"
            );
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        let page = ErrorPage {
            status: status.as_u16(),
            message: display_message(self),
            trace_id: self.trace_id(),
        };
        match views::render("error.html", &page) {
            Ok(body) => builder.content_type(ContentType::html()).body(body),
            Err(err) => {
                error!(error = %err, "error page failed to render");
                builder
                    .content_type(ContentType::plaintext())
                    .body(page.message.to_owned())
            }
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

/// Turn recoverable failures into a flash notice plus redirect.
///
/// - `Unauthorized` goes to `/login`.
/// - `Forbidden` goes back to `resource_path`.
/// - `NotFound` goes to the listing index.
/// - `Conflict` goes to `/register`.
///
/// Everything else propagates to the error page.
pub fn recover(
    session: &SessionContext,
    error: Error,
    resource_path: &str,
) -> ApiResult<HttpResponse> {
    let location = match error.code() {
        ErrorCode::Unauthorized => "/login",
        ErrorCode::Forbidden => resource_path,
        ErrorCode::NotFound => "/campgrounds",
        ErrorCode::Conflict => "/register",
        _ => return Err(error),
    };
    warn!(code = error.code().as_str(), location, "request recovered with redirect");
    session.flash_error(error.message())?;
    Ok(redirect(location))
}

/// `302 Found` to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location.to_owned()))
        .finish()
}

/// Default service for unmatched routes.
pub async fn page_not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    warn!(path = req.path(), "no route matched");
    Err(Error::not_found(PAGE_NOT_FOUND_MESSAGE))
}
