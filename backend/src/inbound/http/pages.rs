//! Static pages.

use actix_web::{HttpResponse, get, web};

use crate::domain::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{self, Blank};

/// Landing page.
#[get("/")]
pub async fn home(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    views::page(&session, &state, "home.html", Blank {}).await
}
