//! Time-boxed report snapshot.
//!
//! The report is fetched at most once per TTL. Within the interval every
//! caller gets the same outcome: the same `Arc` snapshot on success, or the
//! same error on failure (no automatic retry). `refresh` forces a new fetch.
//!
//! The slot lock is held across a refresh, so two callers that find the
//! snapshot stale never fetch twice.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::data::usda::ReportSource;
use crate::domain::NormalizedReport;
use crate::error::ReportError;
use crate::io::ingest::normalize;
use crate::io::rules::NormalizeRules;

pub type ReportOutcome = Result<Arc<NormalizedReport>, ReportError>;

struct CachedOutcome {
    outcome: ReportOutcome,
    fetched_at: Instant,
}

pub struct ReportCache<S> {
    source: S,
    rules: NormalizeRules,
    ttl: Duration,
    slot: Mutex<Option<CachedOutcome>>,
}

impl<S: ReportSource> ReportCache<S> {
    pub fn new(source: S, rules: NormalizeRules, ttl: Duration) -> Self {
        Self {
            source,
            rules,
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn get_or_refresh(&self) -> ReportOutcome {
        self.get_or_refresh_at(Instant::now())
    }

    /// Return the cached outcome if younger than the TTL at `now`, else reload.
    pub fn get_or_refresh_at(&self, now: Instant) -> ReportOutcome {
        let mut slot = self.lock();
        if let Some(cached) = slot.as_ref() {
            if now.saturating_duration_since(cached.fetched_at) < self.ttl {
                tracing::debug!("serving cached market report");
                return cached.outcome.clone();
            }
        }
        Self::reload(&mut slot, &self.source, &self.rules, now)
    }

    pub fn refresh(&self) -> ReportOutcome {
        self.refresh_at(Instant::now())
    }

    /// Reload regardless of age.
    pub fn refresh_at(&self, now: Instant) -> ReportOutcome {
        let mut slot = self.lock();
        Self::reload(&mut slot, &self.source, &self.rules, now)
    }

    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    /// Age of the cached outcome at `now`, if any.
    pub fn age_at(&self, now: Instant) -> Option<Duration> {
        self.lock()
            .as_ref()
            .map(|cached| now.saturating_duration_since(cached.fetched_at))
    }

    fn reload(
        slot: &mut Option<CachedOutcome>,
        source: &S,
        rules: &NormalizeRules,
        now: Instant,
    ) -> ReportOutcome {
        let outcome = source
            .fetch()
            .and_then(|records| normalize(&records, rules))
            .map(Arc::new);

        match &outcome {
            Ok(report) => tracing::info!(
                source = %source.describe(),
                report_date = report.report_date.as_deref().unwrap_or("-"),
                entries = report.entries.len(),
                "market report refreshed"
            ),
            Err(err) => tracing::warn!(source = %source.describe(), %err, "market report unavailable"),
        }

        *slot = Some(CachedOutcome {
            outcome: outcome.clone(),
            fetched_at: now,
        });
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedOutcome>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;
    use crate::io::rules::RawRecord;

    struct CountingSource {
        calls: Cell<usize>,
        fail: Cell<bool>,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fail: Cell::new(false),
            }
        }
    }

    impl ReportSource for CountingSource {
        fn fetch(&self) -> Result<Vec<RawRecord>, ReportError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail.get() {
                return Err(ReportError::Transport("connection refused".to_string()));
            }
            let record = json!({"class": "Steers", "avg_price": 280.0, "avg_weight": 550.0});
            Ok(vec![record.as_object().cloned().unwrap()])
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    const TTL: Duration = Duration::from_secs(3600);

    #[test]
    fn returns_same_snapshot_within_ttl() {
        let cache = ReportCache::new(CountingSource::new(), NormalizeRules::default(), TTL);
        let t0 = Instant::now();

        let a = cache.get_or_refresh_at(t0).unwrap();
        let b = cache.get_or_refresh_at(t0 + Duration::from_secs(3599)).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.source().calls.get(), 1);
    }

    #[test]
    fn refetches_after_ttl() {
        let cache = ReportCache::new(CountingSource::new(), NormalizeRules::default(), TTL);
        let t0 = Instant::now();

        let a = cache.get_or_refresh_at(t0).unwrap();
        let b = cache.get_or_refresh_at(t0 + TTL).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a, *b);
        assert_eq!(cache.source().calls.get(), 2);
    }

    #[test]
    fn failures_are_cached_until_refresh() {
        let source = CountingSource::new();
        source.fail.set(true);
        let cache = ReportCache::new(source, NormalizeRules::default(), TTL);
        let t0 = Instant::now();

        assert!(cache.get_or_refresh_at(t0).is_err());
        cache.source().fail.set(false);
        assert!(cache.get_or_refresh_at(t0 + Duration::from_secs(60)).is_err());
        assert_eq!(cache.source().calls.get(), 1);

        assert!(cache.refresh_at(t0 + Duration::from_secs(61)).is_ok());
        assert_eq!(cache.source().calls.get(), 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let cache = ReportCache::new(CountingSource::new(), NormalizeRules::default(), TTL);
        let t0 = Instant::now();

        cache.get_or_refresh_at(t0).unwrap();
        assert_eq!(cache.age_at(t0 + Duration::from_secs(5)), Some(Duration::from_secs(5)));

        cache.invalidate();
        assert_eq!(cache.age_at(t0), None);
        cache.get_or_refresh_at(t0).unwrap();
        assert_eq!(cache.source().calls.get(), 2);
    }

    #[test]
    fn normalization_errors_surface_through_cache() {
        struct EmptySource;
        impl ReportSource for EmptySource {
            fn fetch(&self) -> Result<Vec<RawRecord>, ReportError> {
                Ok(Vec::new())
            }
            fn describe(&self) -> String {
                "empty".to_string()
            }
        }

        let cache = ReportCache::new(EmptySource, NormalizeRules::default(), TTL);
        assert_eq!(cache.get_or_refresh().unwrap_err(), ReportError::EmptySource);
    }

    #[test]
    fn concurrent_callers_share_one_fetch() {
        use std::sync::Barrier;
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct SlowSource {
            calls: AtomicUsize,
        }

        impl ReportSource for SlowSource {
            fn fetch(&self) -> Result<Vec<RawRecord>, ReportError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(200));
                let record = json!({"class": "Heifers", "avg_price": 250.0, "avg_weight": 520.0});
                Ok(vec![record.as_object().cloned().unwrap()])
            }

            fn describe(&self) -> String {
                "slow".to_string()
            }
        }

        const CALLERS: usize = 8;
        let cache = Arc::new(ReportCache::new(
            SlowSource { calls: AtomicUsize::new(0) },
            NormalizeRules::default(),
            TTL,
        ));
        let start = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let start = Arc::clone(&start);
                std::thread::spawn(move || {
                    start.wait();
                    cache.get_or_refresh().unwrap()
                })
            })
            .collect();
        let snapshots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(cache.source().calls.load(Ordering::SeqCst), 1);
        assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
    }
}
