//! Registration, login and logout handlers.

use axum::{
    response::{Redirect, Response},
    Form,
};
use derive_more::Debug;
use secrecy::SecretBox;
use serde::Deserialize;
use service::{
    command::{
        self, create_user_session, register_user, Command, SessionOutput,
    },
    domain::user,
};
use tracerr::Traced;
use tracing as log;

use crate::{AsError as _, Context, Error, Notice, Service};

/// Credentials submitted by a registration or login form.
///
/// Missing fields are read as empty.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Submitted username, verbatim.
    #[serde(default)]
    pub username: String,

    /// Submitted password, verbatim.
    #[debug(skip)]
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Parses these [`Credentials`] into a [`user::Username`] and a
    /// [`user::Password`].
    ///
    /// [`None`] is returned if any of them is malformed.
    fn parse(self) -> Option<(user::Username, SecretBox<user::Password>)> {
        let Self { username, password } = self;
        let username = user::Username::new(username)?;
        let password = user::Password::new(password)?;
        Some((username, SecretBox::new(Box::new(password))))
    }
}

/// Handles `POST /register`: registers a new user and logs the session in
/// as it.
///
/// # Errors
///
/// If the credential store fails.
#[tracing::instrument(skip_all, fields(username = %form.username))]
pub async fn register<Db>(
    ctx: Context<Db>,
    form: Form<Credentials>,
) -> Result<Response, Error>
where
    Service<Db>: Command<
        command::RegisterUser,
        Ok = SessionOutput,
        Err = Traced<register_user::ExecutionError>,
    >,
{
    use register_user::ExecutionError as E;

    let Form(form) = form;
    let Some((username, password)) = form.parse() else {
        log::debug!("malformed registration form");
        return Ok(ctx.redirect(Some(Notice::InvalidInput)));
    };

    let res = ctx
        .service()
        .execute(command::RegisterUser { username, password })
        .await;
    match res {
        Ok(out) => Ok(ctx.log_in(&out).redirect(Some(Notice::Registered))),
        Err(e) => match e.as_ref() {
            E::UserAlreadyExists(_) => {
                log::debug!("username is taken");
                Ok(ctx.redirect(Some(Notice::UserExists)))
            }
            E::Db(_) | E::JsonWebTokenEncodeError(_) => Err(e.into_error()),
        },
    }
}

/// Handles `POST /login`: logs the session in as the user owning the
/// submitted credentials.
///
/// Malformed credentials are refused the same way as wrong ones.
///
/// # Errors
///
/// If the credential store fails.
#[tracing::instrument(skip_all, fields(username = %form.username))]
pub async fn login<Db>(
    ctx: Context<Db>,
    form: Form<Credentials>,
) -> Result<Response, Error>
where
    Service<Db>: Command<
        command::CreateUserSession,
        Ok = SessionOutput,
        Err = Traced<create_user_session::ExecutionError>,
    >,
{
    use create_user_session::ExecutionError as E;

    let Form(form) = form;
    let Some((username, password)) = form.parse() else {
        log::info!("login refused");
        return Ok(ctx.redirect(Some(Notice::WrongCredentials)));
    };

    let res = ctx
        .service()
        .execute(command::CreateUserSession::ByCredentials {
            username,
            password,
        })
        .await;
    match res {
        Ok(out) => Ok(ctx.log_in(&out).redirect(None)),
        Err(e) => match e.as_ref() {
            E::InvalidCredentials => {
                log::info!("login refused");
                Ok(ctx.redirect(Some(Notice::WrongCredentials)))
            }
            E::Db(_) | E::JsonWebTokenEncodeError(_) => Err(e.into_error()),
        },
    }
}

/// Handles `GET /logout`: makes the session anonymous, whatever it was.
#[tracing::instrument(
    skip_all,
    fields(username = ctx.session().identity().map(tracing::field::display)),
)]
pub async fn logout<Db>(ctx: Context<Db>) -> Response {
    ctx.log_out().redirect(Some(Notice::LoggedOut))
}

/// Handles `GET /register` and `GET /login`, which only redirect to the
/// index page.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn home() -> Redirect {
    Redirect::to("/")
}
