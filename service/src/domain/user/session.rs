//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Authentication state of a single client session.
///
/// Either anonymous, or authenticated as exactly one [`user::Username`].
/// The [`user::Username`] is held by value, so the [`Session`] knows nothing
/// about the [`User`] record behind it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Session {
    /// [`user::Username`] this [`Session`] is authenticated as, if any.
    identity: Option<user::Username>,
}

impl Session {
    /// Creates a new anonymous [`Session`].
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { identity: None }
    }

    /// Creates a new [`Session`] authenticated as the provided
    /// [`user::Username`].
    #[must_use]
    pub fn authenticated(username: user::Username) -> Self {
        Self {
            identity: Some(username),
        }
    }

    /// Returns the [`user::Username`] this [`Session`] is authenticated as.
    #[must_use]
    pub fn identity(&self) -> Option<&user::Username> {
        self.identity.as_ref()
    }

    /// Indicates whether this [`Session`] is authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Authenticates this [`Session`] as the provided [`user::Username`],
    /// replacing any previous identity.
    pub fn authenticate(&mut self, username: user::Username) {
        self.identity = Some(username);
    }

    /// Makes this [`Session`] anonymous, whatever its state was before.
    pub fn logout(&mut self) {
        self.identity = None;
    }

    /// Checks whether this [`Session`] may access a protected operation.
    #[must_use]
    pub fn require_authenticated(&self) -> Access {
        self.identity
            .clone()
            .map_or(Access::Deny, Access::Allow)
    }
}

/// Decision of a [`Session::require_authenticated()`] check.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Access {
    /// Access is granted to the authenticated [`user::Username`].
    Allow(user::Username),

    /// [`Session`] is anonymous.
    Deny,
}

/// Signed claims carried by a [`Session`] [`Token`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Claims {
    /// [`user::Username`] the [`Session`] is authenticated as.
    #[serde(rename = "sub")]
    pub username: user::Username,

    /// [`DateTime`] when the [`Token`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self::authenticated(claims.username)
    }
}

/// Signed token of a [`Session`].
///
/// Not verified until authorized.
#[derive(AsRef, Clone, Debug, Display, From)]
#[as_ref(str)]
pub struct Token(String);

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use crate::domain::user::Username;

    use super::{Access, Session};

    fn alice() -> Username {
        Username::new("alice").unwrap()
    }

    #[test]
    fn starts_anonymous() {
        let session = Session::default();

        assert!(!session.is_authenticated());
        assert_eq!(session, Session::anonymous());
        assert_eq!(session.require_authenticated(), Access::Deny);
    }

    #[test]
    fn allows_authenticated() {
        let mut session = Session::anonymous();
        session.authenticate(alice());

        assert_eq!(session.identity(), Some(&alice()));
        assert_eq!(session.require_authenticated(), Access::Allow(alice()));
    }

    #[test]
    fn reauthentication_replaces_identity() {
        let bob = Username::new("bob").unwrap();
        let mut session = Session::authenticated(alice());
        session.authenticate(bob.clone());

        assert_eq!(session.identity(), Some(&bob));
    }

    #[test]
    fn logout_always_denies() {
        let mut authenticated = Session::authenticated(alice());
        authenticated.logout();
        assert_eq!(authenticated.require_authenticated(), Access::Deny);

        let mut anonymous = Session::anonymous();
        anonymous.logout();
        assert_eq!(anonymous.require_authenticated(), Access::Deny);
    }

    #[test]
    fn cycles_between_states() {
        let mut session = Session::anonymous();
        for _ in 0..3 {
            session.authenticate(alice());
            assert!(session.is_authenticated());
            session.logout();
            assert!(!session.is_authenticated());
        }
    }
}
