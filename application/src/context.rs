//! [`Context`]-related definitions.

use std::mem;

use axum::{
    async_trait,
    extract::FromRequestParts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service::{
    command::{self, Command as _, SessionOutput},
    domain::user::Session,
    infra::Postgres,
};
use tracing as log;

use crate::{define_error, Error, Notice, Service};

/// Name of the cookie carrying a signed session token.
const SESSION_COOKIE: &str = "session";

/// Per-request application context.
#[derive(Debug)]
pub struct Context<Db = Postgres> {
    /// [`Service`] instance.
    service: Service<Db>,

    /// Cookies of the request, with the changes to respond with.
    cookies: CookieJar,

    /// [`Session`] resolved from the request cookies.
    session: Session,
}

impl<Db> Context<Db> {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service<Db> {
        &self.service
    }

    /// Returns the current [`Session`] of this [`Context`].
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Authenticates the current [`Session`] as the [`User`] of the provided
    /// [`SessionOutput`], replacing any previous identity.
    ///
    /// [`User`]: service::domain::User
    #[must_use]
    pub fn log_in(mut self, out: &SessionOutput) -> Self {
        self.session.authenticate(out.user.username.clone());
        self.cookies = mem::take(&mut self.cookies).add(
            Cookie::build((SESSION_COOKIE, out.token.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        );
        self
    }

    /// Makes the current [`Session`] anonymous.
    #[must_use]
    pub fn log_out(mut self) -> Self {
        self.session.logout();
        self.cookies = mem::take(&mut self.cookies)
            .remove(Cookie::build(SESSION_COOKIE).path("/"));
        self
    }

    /// Takes the pending [`Notice`], if any, so it's shown only once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        let code = self.cookies.get(Notice::COOKIE)?.value().to_owned();
        self.cookies = mem::take(&mut self.cookies)
            .remove(Cookie::build(Notice::COOKIE).path("/"));
        code.parse().ok()
    }

    /// Responds with the provided `body`, applying cookie changes.
    #[must_use]
    pub fn respond(self, body: impl IntoResponse) -> Response {
        (self.cookies, body).into_response()
    }

    /// Redirects to the index page, leaving the provided [`Notice`] for it.
    #[must_use]
    pub fn redirect(mut self, notice: Option<Notice>) -> Response {
        if let Some(notice) = notice {
            self.cookies = mem::take(&mut self.cookies).add(
                Cookie::build((Notice::COOKIE, notice.as_ref().to_owned()))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax),
            );
        }
        self.respond(Redirect::to("/"))
    }

    /// Resolves the [`Session`] carried by the provided `cookies`.
    ///
    /// Missing, malformed, forged and expired tokens all resolve to an
    /// anonymous [`Session`].
    async fn resolve_session(
        service: &Service<Db>,
        cookies: &CookieJar,
    ) -> Session
    where
        Db: Sync,
    {
        let Some(cookie) = cookies.get(SESSION_COOKIE) else {
            return Session::anonymous();
        };
        service
            .execute(command::AuthorizeUserSession {
                token: cookie.value().to_owned().into(),
            })
            .await
            .unwrap_or_else(|e| {
                log::debug!("rejected session token: {e}");
                Session::anonymous()
            })
    }
}

#[async_trait]
impl<S, Db> FromRequestParts<S> for Context<Db>
where
    S: Send + Sync,
    Db: Clone + Send + Sync + 'static,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service<Db>>()
            .cloned()
            .ok_or(ContextError::MissingService)?;
        let cookies = CookieJar::from_headers(&parts.headers);
        let session = Self::resolve_session(&service, &cookies).await;

        Ok(Self {
            service,
            cookies,
            session,
        })
    }
}

define_error! {
    enum ContextError {
        #[code = "INTERNAL_SERVER_ERROR"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "Missing `Service` extension"]
        MissingService,
    }
}
