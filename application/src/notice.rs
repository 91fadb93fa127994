//! [`Notice`] definitions.

use strum::{AsRefStr, EnumString};

/// One-time message shown to a client on its next `GET /` visit.
///
/// Travels between requests as its code in a cookie.
#[derive(AsRefStr, Clone, Copy, Debug, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum Notice {
    /// New user is registered and the session is logged in as it.
    Registered,

    /// Registration is refused because the username is taken.
    UserExists,

    /// Registration form is malformed.
    InvalidInput,

    /// Login is refused.
    WrongCredentials,

    /// Session is logged out.
    LoggedOut,

    /// Protected page is requested by an anonymous session.
    LoginRequired,
}

impl Notice {
    /// Name of the cookie carrying a [`Notice`] code.
    pub const COOKIE: &'static str = "notice";

    /// Returns the human-readable message of this [`Notice`].
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Registered => "registered and logged in",
            Self::UserExists => "user already exists",
            Self::InvalidInput => "invalid username or password",
            Self::WrongCredentials => "wrong user or password",
            Self::LoggedOut => "Logged out",
            Self::LoginRequired => "You must be logged in",
        }
    }
}
