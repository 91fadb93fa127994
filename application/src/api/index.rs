//! Index page handler.

use axum::response::{Html, Response};

use crate::Context;

use super::page;

/// Handles `GET /`: renders the landing page, showing the pending notice
/// once.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn index<Db>(mut ctx: Context<Db>) -> Response {
    let notice = ctx.take_notice();
    let page = page::index(ctx.session(), notice);
    ctx.respond(Html(page))
}
