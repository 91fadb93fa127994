//! [`Command`] for creating a [`Session`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{Password, Session, Username};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::{Command, SessionOutput};

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Username`] of a [`User`].
        username: user::Username,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Username>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    > + Sync,
{
    type Ok = SessionOutput;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { username, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(username)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::InvalidCredentials)
                    .map_err(tracerr::wrap!())?;

                if &user.password != password.expose_secret() {
                    return Err(tracerr::new!(E::InvalidCredentials));
                }

                user
            }
        };

        log::debug!(user.username = %user.username, "`User` logged in");

        let (token, expires_at) = self
            .issue_session_token(&user.username)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(SessionOutput {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    ///
    /// Unknown [`Username`] and wrong [`Password`] are not distinguished.
    #[display("Wrong `User` credentials")]
    InvalidCredentials,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use secrecy::SecretBox;

    use crate::{
        command::RegisterUser,
        domain::user,
        infra::Memory,
        Command as _, Config, Service,
    };

    use super::{CreateUserSession, ExecutionError};

    fn service() -> Service<Memory> {
        Service::new(
            Config::new("test-secret", Duration::from_secs(60)),
            Memory::new(),
        )
    }

    fn secret(password: &str) -> SecretBox<user::Password> {
        let password = user::Password::new(password).unwrap();
        SecretBox::init_with(move || password)
    }

    fn login(name: &str, password: &str) -> CreateUserSession {
        CreateUserSession::ByCredentials {
            username: user::Username::new(name).unwrap(),
            password: secret(password),
        }
    }

    async fn registered(name: &str, password: &str) -> Service<Memory> {
        let svc = service();
        _ = svc
            .execute(RegisterUser {
                username: user::Username::new(name).unwrap(),
                password: secret(password),
            })
            .await
            .unwrap();
        svc
    }

    #[tokio::test]
    async fn logs_in_with_registered_credentials() {
        let svc = registered("alice", "pw1").await;

        let out = svc.execute(login("alice", "pw1")).await.unwrap();

        assert_eq!(out.user.username, user::Username::new("alice").unwrap());
        assert!(!out.token.as_ref().is_empty());
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let svc = registered("alice", "pw1").await;

        for wrong in ["wrong", "PW1", "pw1 ", ""] {
            let err = svc.execute(login("alice", wrong)).await.unwrap_err();
            assert!(
                matches!(err.as_ref(), ExecutionError::InvalidCredentials),
                "`{wrong}` must be rejected",
            );
        }
    }

    #[tokio::test]
    async fn unknown_user_is_indistinguishable() {
        let svc = registered("alice", "pw1").await;

        let unknown = svc.execute(login("bob", "x")).await.unwrap_err();
        let wrong = svc.execute(login("alice", "x")).await.unwrap_err();

        assert!(matches!(unknown.as_ref(), ExecutionError::InvalidCredentials));
        assert_eq!(unknown.as_ref().to_string(), wrong.as_ref().to_string());
    }

    #[tokio::test]
    async fn empty_password_round_trips() {
        let svc = registered("dave", "").await;

        assert!(svc.execute(login("dave", "")).await.is_ok());
        assert!(svc.execute(login("dave", " ")).await.is_err());
    }
}
