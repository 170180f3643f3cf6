//! Selection resolution against a store snapshot

use crate::api::{SelectionError, VideoId, VideoRecord};

use super::store::CatalogStore;

/// Outcome of resolving a requested id
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    Found(&'a VideoRecord),
    NotFound,
    /// Nothing to resolve against yet; fetch, then resolve again
    PendingFetch,
}

/// Resolve `id` against the current store contents. Never fetches.
pub fn resolve(id: VideoId, store: &CatalogStore) -> Resolution<'_> {
    if store.is_empty() {
        return Resolution::PendingFetch;
    }

    match store.find(id) {
        Some(record) => Resolution::Found(record),
        None => Resolution::NotFound,
    }
}

/// Parse a raw `id` query value, then resolve it
pub fn resolve_query<'a>(raw: &str, store: &'a CatalogStore) -> Result<Resolution<'a>, SelectionError> {
    let id: VideoId = raw.parse()?;
    Ok(resolve(id, store))
}
