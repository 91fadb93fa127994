//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// A single type may handle many different `Args`: a service executes its
/// commands and queries through it, and a storage executes its operations.
///
/// Execution is [`Send`], so a [`Handler`] is usable from multi-threaded
/// executors behind generic bounds.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>> + Send;
}
