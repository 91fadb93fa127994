//! [`Database`]-related implementations.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    /// [`User`] with the same [`user::Username`] is stored already.
    #[display("`{_0}` username is occupied")]
    #[from(ignore)]
    DuplicateUsername(#[error(not(source))] user::Username),
}
