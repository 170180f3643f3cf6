//! Derived orderings and filtering of a catalog snapshot
//!
//! Every function here borrows the snapshot and returns a new sequence of
//! references; the store itself is never reordered.

use clap::ValueEnum;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::VideoRecord;

/// Grid ordering selected by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Newest first by creation timestamp, ties keep store order
    #[default]
    Recent,
    /// Placeholder: random shuffle. There is no popularity signal in the catalog.
    Popular,
    /// Placeholder: store order reversed. There is no rating signal in the catalog.
    Rated,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Recent, SortKey::Popular, SortKey::Rated];

    /// Next key in the cycle used by the sort control
    pub fn next(self) -> Self {
        match self {
            SortKey::Recent => SortKey::Popular,
            SortKey::Popular => SortKey::Rated,
            SortKey::Rated => SortKey::Recent,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Recent => "Most recent",
            SortKey::Popular => "Popular (shuffled)",
            SortKey::Rated => "Top rated (reversed)",
        }
    }

    /// Whether the ordering is a deterministic function of the snapshot
    pub fn is_deterministic(self) -> bool {
        !matches!(self, SortKey::Popular)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Recent => "recent",
            SortKey::Popular => "popular",
            SortKey::Rated => "rated",
        };
        f.write_str(name)
    }
}

/// Order `records` by `key`. `rng` is only drawn from by the shuffle placeholder.
pub fn sort_records<'a, R>(records: &'a [VideoRecord], key: SortKey, rng: &mut R) -> Vec<&'a VideoRecord>
where
    R: Rng + ?Sized,
{
    let mut sorted: Vec<&VideoRecord> = records.iter().collect();

    match key {
        // sort_by is stable
        SortKey::Recent => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Popular => sorted.shuffle(rng),
        SortKey::Rated => sorted.reverse(),
    }

    sorted
}

/// Keep records whose title contains `query`, ignoring case
pub fn filter_records<'a>(records: Vec<&'a VideoRecord>, query: &str) -> Vec<&'a VideoRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|record| record.title.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VideoId;
    use crate::catalog::testing::record;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ids(records: &[&VideoRecord]) -> Vec<u64> {
        records.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn test_recent_is_newest_first_and_stable() {
        let records = vec![record(1, 5), record(2, 9), record(3, 5), record(4, 1)];
        let mut rng = StdRng::seed_from_u64(7);
        let sorted = sort_records(&records, SortKey::Recent, &mut rng);

        // 1 and 3 tie, store order between them is kept
        assert_eq!(ids(&sorted), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_rated_reverses_store_order() {
        let records = vec![record(1, 5), record(2, 9), record(3, 1)];
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(ids(&sort_records(&records, SortKey::Rated, &mut rng)), vec![3, 2, 1]);
    }

    #[test]
    fn test_popular_is_a_permutation() {
        let records: Vec<VideoRecord> = (1..=20).map(|id| record(id, id as u32)).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let mut shuffled = ids(&sort_records(&records, SortKey::Popular, &mut rng));
        shuffled.sort_unstable();
        assert_eq!(shuffled, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_sorting_does_not_touch_snapshot() {
        let records = vec![record(1, 1), record(2, 2), record(3, 3)];
        let before = records.clone();
        let mut rng = StdRng::seed_from_u64(1);
        for key in SortKey::ALL {
            let _ = sort_records(&records, key, &mut rng);
        }
        assert_eq!(records, before);
    }

    #[test]
    fn test_filter_matches_title_case_insensitively() {
        let mut a = record(1, 1);
        a.title = "Noche de Verano".to_string();
        let mut b = record(2, 2);
        b.title = "Invierno".to_string();
        let records = vec![a, b];
        let all: Vec<&VideoRecord> = records.iter().collect();

        let found = filter_records(all.clone(), "  VERANO ");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, VideoId(1));

        assert_eq!(filter_records(all.clone(), "").len(), 2);
        assert!(filter_records(all, "otoño").is_empty());
    }

    #[test]
    fn test_sort_key_cycle() {
        assert_eq!(SortKey::Recent.next(), SortKey::Popular);
        assert_eq!(SortKey::Popular.next(), SortKey::Rated);
        assert_eq!(SortKey::Rated.next(), SortKey::Recent);
        assert!(!SortKey::Popular.is_deterministic());
    }

    proptest! {
        #[test]
        fn recent_is_non_increasing_and_idempotent(days in proptest::collection::vec(0u32..30, 0..50)) {
            let records: Vec<VideoRecord> = days
                .iter()
                .enumerate()
                .map(|(i, &day)| record(i as u64, day))
                .collect();
            let mut rng = StdRng::seed_from_u64(0);

            let once = sort_records(&records, SortKey::Recent, &mut rng);
            for pair in once.windows(2) {
                prop_assert!(pair[0].created_at >= pair[1].created_at);
                // stability: equal timestamps keep store order (ids are store positions)
                if pair[0].created_at == pair[1].created_at {
                    prop_assert!(pair[0].id < pair[1].id);
                }
            }

            let snapshot: Vec<VideoRecord> = once.iter().map(|r| (*r).clone()).collect();
            let twice = sort_records(&snapshot, SortKey::Recent, &mut rng);
            prop_assert_eq!(ids(&once), ids(&twice));
        }
    }
}
