//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};

use crate::domain::ports::{
    MockListingLifecycle, MockLoginService, MockRegistrationService, MockReviewLifecycle,
};
use crate::domain::{Error, Identity, UserId, Username};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Path of the helper route that signs the fixture user in.
pub const SIGN_IN_PATH: &str = "/__test/sign-in";
/// Path of the helper route that echoes the remembered post-login path.
pub const RETURN_TO_PATH: &str = "/__test/return-to";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The user every handler test signs in as.
pub fn fixture_identity() -> Identity {
    Identity::new(
        UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id"),
        Username::new("ada").expect("fixture username"),
    )
}

/// Let `login` resolve the fixture user's session, and nobody else's.
pub fn resolve_fixture_user(login: &mut MockLoginService) {
    login.expect_find_identity().returning(|user_id| {
        let fixture = fixture_identity();
        Ok((user_id == fixture.user_id()).then_some(fixture))
    });
}

/// Login port that only knows the fixture user.
pub fn fixture_login() -> MockLoginService {
    let mut login = MockLoginService::new();
    resolve_fixture_user(&mut login);
    login
}

/// Handler for [`SIGN_IN_PATH`].
pub async fn sign_in_fixture(session: SessionContext) -> Result<HttpResponse, Error> {
    session.persist_identity(&fixture_identity())?;
    Ok(HttpResponse::Ok().finish())
}

/// Handler for [`RETURN_TO_PATH`]; the body is empty when nothing is stored.
pub async fn return_to_fixture(session: SessionContext) -> Result<HttpResponse, Error> {
    let path = session.take_return_to()?.unwrap_or_default();
    Ok(HttpResponse::Ok().body(path))
}

/// Extract the session cookie set by a response.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Ports whose mocks carry no expectations beyond resolving the fixture
/// user's session; any other call fails the test.
pub fn untouched_ports() -> HttpStatePorts {
    HttpStatePorts {
        listings: Arc::new(MockListingLifecycle::new()),
        reviews: Arc::new(MockReviewLifecycle::new()),
        login: Arc::new(fixture_login()),
        registration: Arc::new(MockRegistrationService::new()),
    }
}

/// Wrap ports as handler state without a map token.
pub fn state(ports: HttpStatePorts) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(ports, None))
}
