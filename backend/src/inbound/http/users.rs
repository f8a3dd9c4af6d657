//! Account pages: registration, login and logout.
//!
//! ```text
//! GET  /register    POST /register
//! GET  /login       POST /login
//! GET  /logout
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use tracing::info;

use crate::domain::{ApiResult, Error, ErrorCode, LoginCredentials, parse_registration};
use crate::inbound::http::error::{recover, redirect};
use crate::inbound::http::forms::read_submission;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{self, Blank};

/// Notice after a successful registration.
pub const WELCOME_MESSAGE: &str = "Welcome to Yelp Camp";
/// Notice after a successful login.
pub const WELCOME_BACK_MESSAGE: &str = "Welcome back";
/// Notice after logout.
pub const LOGGED_OUT_MESSAGE: &str = "Successfully logged out";

const REGISTER_PATH: &str = "/register";
const LOGIN_PATH: &str = "/login";
const LANDING_PATH: &str = "/campgrounds";

#[get("/register")]
pub async fn register_form(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    views::page(&session, &state, "users/register.html", Blank {}).await
}

/// Create an account and sign it in.
///
/// Any rejection, including malformed fields, is shown back on the
/// registration form.
#[post("/register")]
pub async fn register(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let outcome: ApiResult<HttpResponse> = async {
        let submission = read_submission(&req, body).await?;
        let registration = parse_registration(&submission.payload)?;
        let identity = state.registration.register(&registration).await?;
        session.persist_identity(&identity)?;
        session.flash_success(WELCOME_MESSAGE)?;
        Ok(redirect(LANDING_PATH))
    }
    .await;
    outcome.or_else(|err| match err.code() {
        ErrorCode::InvalidRequest => {
            session.flash_error(err.message())?;
            Ok(redirect(REGISTER_PATH))
        }
        _ => recover(&session, err, REGISTER_PATH),
    })
}

#[get("/login")]
pub async fn login_form(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    views::page(&session, &state, "users/login.html", Blank {}).await
}

/// Verify credentials and continue to the remembered page.
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let outcome: ApiResult<HttpResponse> = async {
        let submission = read_submission(&req, body).await?;
        let credentials = LoginCredentials::try_from_parts(
            submission.payload.get("username").unwrap_or_default(),
            submission.payload.get("password").unwrap_or_default(),
        )
        .map_err(|err| Error::unauthorized(err.to_string()))?;
        let identity = state.login.authenticate(&credentials).await?;
        let return_to = session.take_return_to()?;
        session.persist_identity(&identity)?;
        session.flash_success(WELCOME_BACK_MESSAGE)?;
        info!(user_id = %identity.user_id(), "signed in");
        Ok(redirect(return_to.as_deref().unwrap_or(LANDING_PATH)))
    }
    .await;
    outcome.or_else(|err| recover(&session, err, LOGIN_PATH))
}

#[get("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.logout();
    session.flash_success(LOGGED_OUT_MESSAGE)?;
    Ok(redirect(LANDING_PATH))
}
