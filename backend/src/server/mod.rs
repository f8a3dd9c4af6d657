//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite, time::Duration};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::CONTENT_SECURITY_POLICY;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::inbound::http::error::page_not_found;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{campgrounds, pages, reviews, users};
use crate::middleware::{MethodOverride, Trace};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "session";
/// Signed-in sessions last a week.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Content Security Policy sent with every response.
///
/// Allows the CDN styles and scripts the templates load, the Mapbox map
/// tiles and workers, and images from the image host.
pub const CONTENT_SECURITY_POLICY_VALUE: &str = concat!(
    "default-src 'self'; ",
    "connect-src 'self' https://api.mapbox.com/ https://a.tiles.mapbox.com/ ",
    "https://b.tiles.mapbox.com/ https://events.mapbox.com/; ",
    "script-src 'unsafe-inline' 'self' https://api.tiles.mapbox.com/ https://api.mapbox.com/ ",
    "https://kit.fontawesome.com/ https://cdnjs.cloudflare.com/ https://cdn.jsdelivr.net; ",
    "style-src 'self' 'unsafe-inline' https://kit-free.fontawesome.com/ https://api.mapbox.com/ ",
    "https://api.tiles.mapbox.com/ https://fonts.googleapis.com/ https://use.fontawesome.com/ ",
    "https://cdn.jsdelivr.net; ",
    "worker-src 'self' blob:; ",
    "object-src 'none'; ",
    "img-src 'self' blob: data: https://res.cloudinary.com/ https://images.unsplash.com/; ",
    "font-src 'self'"
);

/// Everything one application instance needs.
#[derive(Clone)]
pub struct AppDependencies {
    pub http_state: web::Data<HttpState>,
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Cookie-backed session store: the state is encrypted into the cookie, so
/// sessions survive restarts as long as the key does.
pub fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::days(SESSION_TTL_DAYS)),
        )
        .build()
}

/// Register every page and mutation.
///
/// `/campgrounds/new` is registered ahead of `/campgrounds/{id}` so the
/// literal segment wins.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::home)
        .service(campgrounds::index)
        .service(campgrounds::new_form)
        .service(campgrounds::create)
        .service(campgrounds::show)
        .service(campgrounds::edit_form)
        .service(campgrounds::update)
        .service(campgrounds::destroy)
        .service(reviews::create)
        .service(reviews::destroy)
        .service(users::register_form)
        .service(users::register)
        .service(users::login_form)
        .service(users::login)
        .service(users::logout);
}

/// Assemble the application with its middleware stack.
///
/// Requests pass through `Trace`, then `MethodOverride` (before routing),
/// then the security headers and the session.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    App::new()
        .app_data(http_state)
        .wrap(session_middleware(key, cookie_secure, same_site))
        .wrap(DefaultHeaders::new().add((CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY_VALUE)))
        .wrap(MethodOverride)
        .wrap(Trace)
        .configure(configure_routes)
        .default_service(web::to(page_not_found))
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when a provider client cannot be built or
/// binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        settings: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    Ok(server)
}
