//! # Refresh Flow
//!
//! Manager lifecycle against a store the pipeline keeps writing to:
//!
//! 1. Cold start builds one filter per file with batches
//! 2. New batches rebuild only their file's filter
//! 3. Eviction trims the evicted file's filter
//! 4. A failed cycle leaves the installed filters in place

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bfd_loaded_filters::{FilterConfig, FilterManager, LoadedBatchStore, RefreshTask};
    use bfd_telemetry::{init_tracing, TelemetryConfig};
    use shared_types::DateRange;

    use crate::fixtures::PipelineSimulator;

    const SAMPLE_BENE: &str = "567834";

    fn init_logs() {
        // Another test may already have installed the subscriber.
        let _ = init_tracing(&TelemetryConfig::default().with_log_level("bfd_loaded_filters=debug"));
    }

    #[test]
    fn test_full_lifecycle() {
        init_logs();
        let sim = PipelineSimulator::new();
        let store = sim.store();
        let manager = FilterManager::new(&FilterConfig::default()).unwrap();
        manager.init(store.as_ref());

        // Cold start
        let f1 = sim.start_file("BENEFICIARY");
        let t1 = sim.commit_batch(f1, &[SAMPLE_BENE]);
        let f2 = sim.start_file("CARRIER");
        sim.commit_batch(f2, &["42"]);
        let first = manager.refresh_as_of(store.as_ref(), sim.tick(1)).unwrap();
        assert_eq!(first.filter_count, 2);
        let cold = manager.filters();

        // A file with no batches yet is not indexed
        let f3 = sim.start_file("BENEFICIARY");
        let outcome = manager.refresh_as_of(store.as_ref(), sim.tick(1)).unwrap();
        assert!(!outcome.merged);
        assert_eq!(manager.filters().len(), 2);

        // Its first batch lands; older filters survive by identity
        let t3 = sim.commit_batch(f3, &["7"]);
        let outcome = manager.refresh_as_of(store.as_ref(), sim.tick(1)).unwrap();
        assert_eq!(outcome.filters_built, 1);
        assert_eq!(outcome.filters_reused, 2);
        let warm = manager.filters();
        assert_eq!(warm[0].file_id(), f3);
        assert!(Arc::ptr_eq(&warm[1], &cold[0]));
        assert!(Arc::ptr_eq(&warm[2], &cold[1]));
        assert_eq!(manager.transaction_time(), t3);

        // Read path
        let around_t1 = DateRange::between(t1, t1);
        assert!(!manager.is_result_set_empty(SAMPLE_BENE, &around_t1));
        assert!(manager.is_result_set_empty("7", &around_t1));
        assert!(manager.is_in_bounds(&around_t1));

        // Eviction of the oldest file
        sim.evict_file(f1);
        let outcome = manager.refresh_as_of(store.as_ref(), sim.tick(1)).unwrap();
        assert!(outcome.trimmed);
        assert_eq!(outcome.filters_removed, 1);
        let trimmed = manager.filters();
        assert_eq!(trimmed.len(), 2);
        assert!(Arc::ptr_eq(&trimmed[0], &warm[0]));
        assert!(trimmed.iter().all(|f| f.file_id() != f1));
    }

    #[test]
    fn test_commits_after_refresh_are_not_ruled_out() {
        let sim = PipelineSimulator::new();
        let store = sim.store();
        let manager = FilterManager::default();

        let f1 = sim.start_file("BENEFICIARY");
        sim.commit_batch(f1, &[SAMPLE_BENE]);
        let watermark = sim.tick(1);
        manager.refresh_as_of(store.as_ref(), watermark).unwrap();

        // Committed after the watermark and not yet indexed.
        let late = sim.commit_batch(f1, &["99"]);
        assert!(late > watermark);
        assert!(!manager.is_result_set_empty("99", &DateRange::since(late)));
        assert!(!manager.is_result_set_empty("99", &DateRange::after(watermark)));

        // Starts inside indexed time, ends past the watermark.
        let straddling = DateRange::between(
            watermark - chrono::Duration::seconds(5),
            watermark + chrono::Duration::seconds(5),
        );
        assert!(!manager.is_result_set_empty("99", &straddling));
        assert!(!manager.is_result_set_empty("99", &DateRange::unbounded()));
    }

    #[test]
    fn test_failed_cycle_keeps_previous_filters() {
        let sim = PipelineSimulator::new();
        let store = sim.store();
        let manager = FilterManager::default();

        let f1 = sim.start_file("BENEFICIARY");
        let t1 = sim.commit_batch(f1, &[SAMPLE_BENE]);
        manager.refresh_as_of(store.as_ref(), sim.tick(1)).unwrap();
        let before = manager.snapshot();

        let f2 = sim.start_file("BENEFICIARY");
        sim.commit_batch(f2, &["42"]);
        store.fail_next_fetch();
        assert!(manager.refresh_as_of(store.as_ref(), sim.tick(1)).is_err());

        assert!(Arc::ptr_eq(&before, &manager.snapshot()));
        assert!(!manager.is_result_set_empty(SAMPLE_BENE, &DateRange::between(t1, t1)));
        assert_eq!(store.fetch_all_files().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_task_tracks_pipeline() {
        init_logs();
        let sim = PipelineSimulator::new();
        let store = sim.store();
        let manager = Arc::new(FilterManager::default());
        let config = FilterConfig {
            initial_delay: Duration::ZERO,
            refresh_interval: Duration::from_millis(5),
            ..Default::default()
        };
        let task = RefreshTask::spawn(Arc::clone(&manager), Arc::clone(&store), &config);

        for round in 0..5 {
            let file_id = sim.start_file("BENEFICIARY");
            sim.commit_batch(file_id, &[format!("{}", round)]);

            let mut indexed = false;
            for _ in 0..400 {
                if manager.filters().len() == round + 1 {
                    indexed = true;
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            assert!(indexed, "round {} was never indexed", round);
        }

        task.shutdown().await.unwrap();
        assert!(manager.metrics().refreshes >= 5);
        assert_eq!(manager.metrics().refresh_failures, 0);
    }
}
