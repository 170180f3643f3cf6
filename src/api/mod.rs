//! Video catalog API module

pub mod client;
pub mod models;

pub use client::{CatalogClient, CatalogSource, FetchError};
pub use models::*;
