//! # Storage Layer
//!
//! Database engines and artifact storage resolvers, each behind a
//! [`tl_core::BackendRegistry`] so the server never names a concrete
//! implementation.
//!
//! - [`database`]: `sqlite`, `postgresql`
//! - [`resolver`]: `proxy`, `local`, `s3`

pub mod database;
pub mod resolver;

pub use database::{DatabaseRegistry, DatabaseSettings};
pub use resolver::{ResolverRegistry, StorageSettings};
