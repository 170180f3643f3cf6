//! Catalog store
//!
//! Holds the last fetched catalog for the lifetime of a page. The only way to
//! change its contents is a full replace, so views never observe a partially
//! updated sequence.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::api::{CatalogSource, FetchError, VideoId, VideoRecord};

/// Load state of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// No fetch has completed yet
    Unfetched,
    /// A fetch completed with zero records
    Empty,
    /// A fetch completed with this many records
    Populated(usize),
}

/// Owned, in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    records: Option<Vec<VideoRecord>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch from `source` and replace the whole catalog on success.
    ///
    /// On failure the previous contents are kept. Calling it again re-fetches
    /// and replaces.
    pub async fn load<S>(&mut self, source: &S) -> Result<&[VideoRecord], FetchError>
    where
        S: CatalogSource + ?Sized,
    {
        let records = source.fetch_catalog().await?;
        self.replace(records);
        Ok(self.records())
    }

    /// Replace the catalog, dropping later duplicates of an id
    pub fn replace(&mut self, records: Vec<VideoRecord>) {
        let mut seen = HashSet::with_capacity(records.len());
        let total = records.len();
        let records: Vec<VideoRecord> = records
            .into_iter()
            .filter(|record| seen.insert(record.id))
            .collect();

        if records.len() != total {
            warn!(
                "Catalog contained {} duplicate ids, keeping first occurrences",
                total - records.len()
            );
        }

        debug!("Catalog replaced with {} videos", records.len());
        self.records = Some(records);
    }

    pub fn status(&self) -> StoreStatus {
        match &self.records {
            None => StoreStatus::Unfetched,
            Some(records) if records.is_empty() => StoreStatus::Empty,
            Some(records) => StoreStatus::Populated(records.len()),
        }
    }

    /// Whether a fetch has completed at least once
    pub fn is_loaded(&self) -> bool {
        self.records.is_some()
    }

    /// True when there is nothing to show, fetched or not.
    ///
    /// Both "no fetch yet" and "fetched zero records" count as empty; the
    /// resolver answers `PendingFetch` for either. Use `status()` or
    /// `is_loaded()` to tell them apart.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.records.as_ref().map_or(0, Vec::len)
    }

    pub fn records(&self) -> &[VideoRecord] {
        self.records.as_deref().unwrap_or(&[])
    }

    /// Exact-match lookup by id.
    ///
    /// Catalogs hold tens to low hundreds of entries, a linear scan is enough.
    pub fn find(&self, id: VideoId) -> Option<&VideoRecord> {
        self.records().iter().find(|record| record.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{catalog, record, ScriptedSource};
    use proptest::prelude::*;

    #[test]
    fn test_status_distinguishes_unfetched_from_empty() {
        let mut store = CatalogStore::new();
        assert_eq!(store.status(), StoreStatus::Unfetched);
        assert!(store.is_empty());
        assert!(!store.is_loaded());

        store.replace(Vec::new());
        assert_eq!(store.status(), StoreStatus::Empty);
        assert!(store.is_empty());
        assert!(store.is_loaded());

        store.replace(catalog(3));
        assert_eq!(store.status(), StoreStatus::Populated(3));
        assert!(!store.is_empty());
    }

    #[test]
    fn test_replace_keeps_first_duplicate() {
        let mut store = CatalogStore::new();
        let mut dup = record(2, 40);
        dup.title = "Duplicate".to_string();
        store.replace(vec![record(1, 1), record(2, 2), dup, record(3, 3)]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.find(VideoId(2)).unwrap().title, "Video 2");
        let ids: Vec<u64> = store.records().iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_load_replaces_and_is_idempotent() {
        let source = ScriptedSource::new(vec![Ok(catalog(3)), Ok(catalog(2))]);
        let mut store = CatalogStore::new();

        assert_eq!(store.load(&source).await.unwrap().len(), 3);
        assert_eq!(store.load(&source).await.unwrap().len(), 2);
        assert_eq!(source.calls(), 2);
        assert!(store.find(VideoId(3)).is_none());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_contents() {
        let source = ScriptedSource::new(vec![Ok(catalog(3)), Err("offline".to_string())]);
        let mut store = CatalogStore::new();

        store.load(&source).await.unwrap();
        assert!(store.load(&source).await.is_err());
        assert_eq!(store.status(), StoreStatus::Populated(3));
    }

    #[tokio::test]
    async fn test_failed_first_load_stays_unfetched() {
        let source = ScriptedSource::new(vec![Err("offline".to_string())]);
        let mut store = CatalogStore::new();

        assert!(store.load(&source).await.is_err());
        assert_eq!(store.status(), StoreStatus::Unfetched);
    }

    proptest! {
        #[test]
        fn find_returns_unique_match(ids in proptest::collection::hash_set(0u64..500, 0..40), wanted in 0u64..500) {
            let records: Vec<VideoRecord> = ids.iter().map(|&id| record(id, (id % 300) as u32)).collect();
            let mut store = CatalogStore::new();
            store.replace(records);

            match store.find(VideoId(wanted)) {
                Some(found) => {
                    prop_assert!(ids.contains(&wanted));
                    prop_assert_eq!(found.id, VideoId(wanted));
                    prop_assert_eq!(store.records().iter().filter(|r| r.id == VideoId(wanted)).count(), 1);
                }
                None => prop_assert!(!ids.contains(&wanted)),
            }
        }
    }
}
