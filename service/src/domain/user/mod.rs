//! [`User`] definitions.

pub mod session;

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Debug, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Registered user.
///
/// Created once on the first use of its [`Username`] and never updated.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Username`] of this [`User`].
    pub username: Username,

    /// [`Password`] of this [`User`], stored verbatim.
    pub password: Password,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Username of a [`User`].
///
/// Compared exactly as submitted: no case folding, no trimming. May not
/// contain NUL characters, which Postgres text columns cannot store.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(into = "String", try_from = "String")]
pub struct Username(String);

impl Username {
    /// Maximum number of characters in a [`Username`].
    pub const MAX_LEN: usize = 50;

    /// Creates a new [`Username`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Username`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        !name.is_empty()
            && !name.contains('\0')
            && name.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Username {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Username`")
    }
}

impl TryFrom<String> for Username {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("invalid `Username`")
    }
}

/// Password of a [`User`].
///
/// Kept and compared in plaintext, byte by byte. Any production deployment
/// requires a salted password hash instead. May not contain NUL characters,
/// which Postgres text columns cannot store.
// TODO: Store an `argon2` hash once clients can re-register.
#[derive(Clone, Debug, Eq, PartialEq)]
#[debug("Password(..)")]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Password(String);

impl Password {
    /// Maximum number of characters in a [`Password`].
    pub const MAX_LEN: usize = 256;

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        !password.contains('\0') && password.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Password, Username};

    #[test]
    fn username_is_taken_verbatim() {
        let name = Username::new(" Alice ").unwrap();

        let raw: &str = name.as_ref();
        assert_eq!(raw, " Alice ");
        assert_ne!(name, Username::new("alice").unwrap());
    }

    #[test]
    fn username_length_is_bounded() {
        assert!(Username::new("").is_none());
        assert!(Username::new("a".repeat(Username::MAX_LEN)).is_some());
        assert!(Username::new("a".repeat(Username::MAX_LEN + 1)).is_none());
        assert!(Username::new("ё".repeat(Username::MAX_LEN)).is_some());
    }

    #[test]
    fn password_length_is_bounded() {
        assert!(Password::new("").is_some());
        assert!(Password::new("p".repeat(Password::MAX_LEN)).is_some());
        assert!(Password::new("p".repeat(Password::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn nul_is_rejected() {
        assert!(Username::new("a\0b").is_none());
        assert!(Username::new("\0").is_none());
        assert!(Password::new("p\0w").is_none());
        assert!(Password::new("\0").is_none());
        assert!("a\0b".parse::<Username>().is_err());
    }

    #[test]
    fn password_comparison_is_exact() {
        let pw = Password::new("Secret").unwrap();

        assert_eq!(pw, Password::new("Secret").unwrap());
        assert_ne!(pw, Password::new("secret").unwrap());
        assert_ne!(pw, Password::new("Secret ").unwrap());
    }

    #[test]
    fn password_is_not_printed() {
        let pw = Password::new("hunter2").unwrap();

        assert_eq!(format!("{pw:?}"), "Password(..)");
    }
}
