//! [`Command`] for registering a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
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

/// [`Command`] for registering a new [`User`] and authenticating a
/// [`Session`] as it.
#[derive(Clone, Debug)]
pub struct RegisterUser {
    /// [`Username`] of a new [`User`].
    pub username: user::Username,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<RegisterUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>
        + Sync,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>
        + Send
        + Sync,
{
    type Ok = SessionOutput;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RegisterUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterUser { username, password } = cmd;

        let existing = self
            .database()
            .execute(Select(By::new(username.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::UserAlreadyExists(username)));
        }

        let user = User {
            id: user::Id::new(),
            username,
            password: password.expose_secret().clone(),
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        // The lookup above is advisory only: a concurrent registration may
        // take the `Username` in between, which the store reports atomically.
        tx.execute(Insert(user.clone()))
            .await
            .map_err(|e| {
                if let database::Error::DuplicateUsername(name) = e.as_ref() {
                    tracerr::new!(E::UserAlreadyExists(name.clone()))
                } else {
                    let into = tracerr::map_from_and_wrap!(=> E);
                    into(e)
                }
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            user.id = %user.id,
            user.username = %user.username,
            "registered `User`",
        );

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

/// Error of [`RegisterUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided [`Username`] exists already.
    #[display("`{_0}` user already exists")]
    #[from(ignore)]
    UserAlreadyExists(#[error(not(source))] user::Username),
}
