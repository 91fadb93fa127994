//! Application serves the HTTP API of the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;
pub mod notice;

// Used in binary.
use axum_client_ip as _;
use refinery as _;
use tokio as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    api::router,
    args::Args,
    config::Config,
    context::Context,
    error::{AsError, Error},
    notice::Notice,
};

/// [`Service`] with filled infrastructure dependencies.
///
/// Backed by [`Postgres`] unless another [`Database`] is provided.
///
/// [`Database`]: service::infra::Database
/// [`Postgres`]: service::infra::Postgres
/// [`Service`]: service::Service
pub type Service<Db = service::infra::Postgres> = service::Service<Db>;
