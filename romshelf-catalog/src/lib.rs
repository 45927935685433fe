//! Catalog data model types and filename-to-title normalization.
//!
//! This crate defines the data model shared by the scanner, the persistence
//! layer and the metadata provider, without any database or network
//! dependencies. Consumers can use these types directly for serialization,
//! display, or passing to `romshelf-db` for persistence.

pub mod normalize;
pub mod types;

pub use normalize::{normalize_title, normalize_title_with};
pub use types::*;
