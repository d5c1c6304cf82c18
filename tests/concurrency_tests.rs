//! # Concurrency Tests using Loom
//!
//! Models the status tally shared between aggregation workers: every
//! counter is a relaxed atomic, and a snapshot taken after joining the
//! workers must see every record exactly once.

#[cfg(test)]
mod tests {
    use loom::sync::Arc;
    use loom::sync::atomic::{AtomicUsize, Ordering};
    use loom::thread;

    /// Mirrors `StatusTally`'s counters with loom atomics.
    #[derive(Default)]
    struct Tally {
        total: AtomicUsize,
        passed: AtomicUsize,
        failed: AtomicUsize,
    }

    impl Tally {
        fn record(&self, passed: bool) {
            let counter = if passed { &self.passed } else { &self.failed };
            counter.fetch_add(1, Ordering::Relaxed);
            self.total.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_tally_counts_every_record_once() {
        const STACK_SIZE: usize = 8 * 1024 * 1024; // 8 MB

        let builder = std::thread::Builder::new()
            .name("loom-test-thread".into())
            .stack_size(STACK_SIZE);

        let handle = builder
            .spawn(|| {
                loom::model(|| {
                    let tally = Arc::new(Tally::default());

                    let handles: Vec<_> = [true, false]
                        .into_iter()
                        .map(|passed| {
                            let tally = tally.clone();
                            thread::spawn(move || tally.record(passed))
                        })
                        .collect();

                    tally.record(true);

                    for handle in handles {
                        handle.join().unwrap();
                    }

                    let total = tally.total.load(Ordering::Relaxed);
                    let passed = tally.passed.load(Ordering::Relaxed);
                    let failed = tally.failed.load(Ordering::Relaxed);
                    assert_eq!(total, 3);
                    assert_eq!(passed, 2);
                    assert_eq!(failed, 1);
                    assert_eq!(passed + failed, total);
                });
            })
            .unwrap();

        handle.join().unwrap();
    }

    #[test]
    fn test_shared_tally_across_std_threads() {
        use pipeline_runner::core::models::{StatusTally, TestResultRecord, TestStatus};

        let tally = std::sync::Arc::new(StatusTally::new());
        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let tally = tally.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        let status = if i % 5 == 0 { TestStatus::Failed } else { TestStatus::Passed };
                        tally.record(&TestResultRecord {
                            uuid: format!("{}-{}", worker, i),
                            history_id: None,
                            name: String::new(),
                            full_name: None,
                            status,
                            start: None,
                            stop: None,
                        });
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let summary = tally.snapshot();
        assert_eq!(summary.total, 100);
        assert_eq!(summary.failed, 20);
        assert_eq!(summary.passed, 80);
        assert!(summary.is_consistent());
    }
}
