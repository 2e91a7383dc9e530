//! # Terralist Core
//!
//! Shared types and traits for the pluggable backends selected at startup.
//!
//! This crate provides:
//! - Backend traits: [`DatabaseEngine`], [`AuthProvider`], [`StorageResolver`]
//! - [`BackendCategory`], the label every dispatch failure carries
//! - [`BackendRegistry`], the discriminant → constructor table reused for
//!   every category

pub mod dispatch;
pub mod traits;
pub mod types;

pub use dispatch::{BackendRegistry, Constructor};
pub use traits::{AuthProvider, DatabaseEngine, StorageResolver};
pub use types::BackendCategory;
