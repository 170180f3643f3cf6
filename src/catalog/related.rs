//! Related videos shown next to the player

use crate::api::{VideoId, VideoRecord};

/// How many related videos the player shows unless configured otherwise
pub const DEFAULT_RELATED_LIMIT: usize = 4;

/// Up to `limit` records other than `current`, in store order.
///
/// The catalog carries no similarity signal, so "related" is simply "the others".
pub fn related_to(current: VideoId, records: &[VideoRecord], limit: usize) -> Vec<&VideoRecord> {
    records
        .iter()
        .filter(|record| record.id != current)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::catalog;
    use proptest::prelude::*;

    #[test]
    fn test_excludes_current_and_keeps_store_order() {
        let records = catalog(6);
        let related = related_to(VideoId(2), &records, DEFAULT_RELATED_LIMIT);
        let ids: Vec<u64> = related.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_returns_all_when_fewer_remain() {
        let records = catalog(3);
        assert_eq!(related_to(VideoId(1), &records, 4).len(), 2);
        assert!(related_to(VideoId(1), &catalog(1), 4).is_empty());
    }

    #[test]
    fn test_unknown_current_takes_first_records() {
        let records = catalog(6);
        assert_eq!(related_to(VideoId(99), &records, 4).len(), 4);
    }

    proptest! {
        #[test]
        fn never_contains_current(n in 1u64..30, pick in 0u64..30, limit in 0usize..8) {
            let records = catalog(n);
            let current = VideoId(pick % n + 1);
            let related = related_to(current, &records, limit);

            prop_assert!(related.iter().all(|r| r.id != current));
            prop_assert_eq!(related.len(), limit.min(n as usize - 1));
        }
    }
}
