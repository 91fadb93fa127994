//! Protected resources and the guard in front of them.

use axum::{
    extract::Request,
    middleware::Next,
    response::{Html, Response},
    Extension,
};
use derive_more::Display;
use service::domain::user::{self, session::Access};
use tracing as log;

use crate::{Context, Notice};

use super::page;

/// [`user::Username`] granted access by the [`require_authenticated()`] guard.
#[derive(Clone, Debug, Display)]
pub struct Identity(pub user::Username);

/// Guard letting only authenticated sessions through.
///
/// Anonymous sessions are redirected to the index page with
/// [`Notice::LoginRequired`], and the guarded handler never runs.
pub async fn require_authenticated<Db>(
    ctx: Context<Db>,
    mut req: Request,
    next: Next,
) -> Response {
    match ctx.session().require_authenticated() {
        Access::Allow(username) => {
            log::debug!(user.username = %username, "access granted");
            _ = req.extensions_mut().insert(Identity(username));
            next.run(req).await
        }
        Access::Deny => {
            log::info!(path = %req.uri().path(), "access denied");
            ctx.redirect(Some(Notice::LoginRequired))
        }
    }
}

/// Handles `GET /secret`: renders the page of the authenticated user.
#[tracing::instrument(skip_all, fields(username = %identity.0))]
pub async fn secret(identity: Extension<Identity>) -> Html<String> {
    let Extension(Identity(username)) = identity;
    Html(page::secret(&username))
}
