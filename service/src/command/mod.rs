//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_user_session;
pub mod register_user;

use common::DateTime;

use crate::{
    domain::{
        user::{self, session},
        User,
    },
    Service,
};

/// [`Command`] of the [`Service`].
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_user_session::CreateUserSession, register_user::RegisterUser,
};

/// Output of a [`Command`] establishing a new [`Session`].
///
/// [`Session`]: session::Session
#[derive(Clone, Debug)]
pub struct SessionOutput {
    /// Signed [`session::Token`] of the established [`Session`].
    ///
    /// [`Session`]: session::Session
    pub token: session::Token,

    /// [`User`] the [`Session`] is authenticated as.
    ///
    /// [`Session`]: session::Session
    pub user: User,

    /// [`DateTime`] when the [`session::Token`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Service<Db> {
    /// Signs a new [`session::Token`] authenticating the provided
    /// [`user::Username`].
    fn issue_session_token(
        &self,
        username: &user::Username,
    ) -> Result<
        (session::Token, session::ExpirationDateTime),
        jsonwebtoken::errors::Error,
    > {
        let expires_at = (DateTime::now() + self.config.session_ttl).coerce();
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &session::Claims {
                username: username.clone(),
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )?;
        Ok((token.into(), expires_at))
    }
}
