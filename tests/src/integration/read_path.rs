//! # Read Path
//!
//! A `_lastUpdated` search as the resource layer runs it: ask the index
//! first, fall through to the store only when the index cannot rule the
//! subject out.

use bfd_loaded_filters::FreshnessIndex;
use shared_types::DateRange;

/// Result of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The index proved the result set empty; the store was not queried.
    ShortCircuited,
    /// The store was queried and returned this many matches.
    Queried(usize),
}

/// Run a `_lastUpdated` search for `subject`.
///
/// `query_store` stands in for the real database query and returns the
/// number of matching records.
pub fn search_last_updated<I, Q>(
    index: &I,
    subject: &str,
    range: &DateRange,
    query_store: Q,
) -> SearchOutcome
where
    I: FreshnessIndex + ?Sized,
    Q: FnOnce(&str, &DateRange) -> usize,
{
    if index.is_result_set_empty(subject, range) {
        return SearchOutcome::ShortCircuited;
    }
    SearchOutcome::Queried(query_store(subject, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::PipelineSimulator;
    use bfd_loaded_filters::FilterManager;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn subject(i: u32) -> String {
        format!("{}", -88_000_000i64 - i as i64)
    }

    #[test]
    fn test_randomized_reads_never_skip_real_changes() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let sim = PipelineSimulator::new();
        let manager = FilterManager::default();

        for _ in 0..6 {
            let file_id = sim.start_file("BENEFICIARY");
            for _ in 0..rng.gen_range(1..5) {
                let subjects: Vec<String> =
                    (0..rng.gen_range(1..50)).map(|_| subject(rng.gen_range(0..500))).collect();
                sim.commit_batch(file_id, &subjects);
            }
            manager.refresh_as_of(sim.store().as_ref(), sim.tick(1)).unwrap();
        }

        let horizon = sim.now();
        let mut short_circuited = 0;
        for _ in 0..2_000 {
            let s = subject(rng.gen_range(0..600));
            let start = horizon - Duration::seconds(rng.gen_range(0..120));
            let end = start + Duration::seconds(rng.gen_range(0..30));
            let range = DateRange::between(start, end);

            let truth = sim.touched(&s, &range);
            match search_last_updated(&manager, &s, &range, |s, r| usize::from(sim.touched(s, r))) {
                SearchOutcome::ShortCircuited => {
                    assert!(!truth, "skipped a real change for {} in {}", s, range);
                    short_circuited += 1;
                }
                SearchOutcome::Queried(n) => assert_eq!(n, usize::from(truth)),
            }
        }

        assert!(short_circuited > 0, "index never short-circuited");
    }

    #[test]
    fn test_every_committed_pair_is_found() {
        let sim = PipelineSimulator::new();
        let manager = FilterManager::default();
        for f in 0..4 {
            let file_id = sim.start_file("CARRIER");
            for b in 0..3 {
                sim.commit_batch(file_id, &[subject(f * 10 + b), subject(100 + b)]);
            }
        }
        manager.refresh_as_of(sim.store().as_ref(), sim.tick(1)).unwrap();

        for (s, created) in sim.committed_pairs() {
            let range = DateRange::between(created, created);
            assert_eq!(
                search_last_updated(&manager, &s, &range, |_, _| 1),
                SearchOutcome::Queried(1)
            );
        }
    }

    #[test]
    fn test_unrefreshed_index_always_queries() {
        let sim = PipelineSimulator::new();
        let file_id = sim.start_file("BENEFICIARY");
        sim.commit_batch(file_id, &["567834"]);
        let manager = FilterManager::default();

        let outcome = search_last_updated(&manager, "1", &DateRange::unbounded(), |_, _| 0);
        assert_eq!(outcome, SearchOutcome::Queried(0));
    }
}
