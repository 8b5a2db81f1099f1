//! Core types and trait definitions for the LocalLib catalog.
//!
//! This crate has no HTTP or database dependencies. Storage
//! backends implement [`store::CatalogStore`]; outer surfaces drive
//! [`catalog::Catalog`].

pub mod catalog;
pub mod derived;
pub mod error;
pub mod integrity;
pub mod model;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
