//! Holder of the published permit dataset.
//!
//! A load reads the whole source, maps it, and swaps the new [`Dataset`] in
//! with a single pointer store. Readers take an `Arc` to whichever snapshot is
//! current and never wait on a load in progress. Loads are single-flight: a
//! load requested while another is running is skipped, not queued.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, TimeDelta, Utc};
use foodtrucks_core::Record;
use parking_lot::Mutex;

use crate::mapper::map_rows;
use crate::source::RecordSource;

/// Immutable, fully built collection of records in source order.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    built_at: DateTime<Utc>,
}

impl Dataset {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            built_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Result of a load or reload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new dataset was published.
    Loaded { records: usize, dropped_rows: usize },
    /// The source could not be read; an empty dataset was published.
    SourceUnavailable { reason: String },
    /// Another load was already running, so nothing was done.
    Skipped,
}

impl LoadOutcome {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Dataset plus the load state that was true when it was published.
#[derive(Debug)]
struct Published {
    dataset: Arc<Dataset>,
    attempted: bool,
    loaded: bool,
    dropped_rows: usize,
    last_error: Option<String>,
}

impl Published {
    fn initial() -> Self {
        Self {
            dataset: Arc::new(Dataset::empty()),
            attempted: false,
            loaded: false,
            dropped_rows: 0,
            last_error: None,
        }
    }
}

/// Point-in-time view of the store for health reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub available: bool,
    pub records: usize,
    pub dropped_rows: usize,
    pub last_error: Option<String>,
    pub last_reload: Option<DateTime<Utc>>,
    /// When the current dataset was built; `None` after a failed load.
    pub built_at: Option<DateTime<Utc>>,
}

pub struct DatasetStore {
    source: Box<dyn RecordSource>,
    published: ArcSwap<Published>,
    last_reload: Mutex<Option<DateTime<Utc>>>,
    load_lock: Mutex<()>,
}

impl std::fmt::Debug for DatasetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetStore")
            .field("source", &self.source.name())
            .field("records", &self.published.load().dataset.len())
            .field("last_reload", &*self.last_reload.lock())
            .finish_non_exhaustive()
    }
}

impl DatasetStore {
    /// Creates a store with nothing loaded yet. The first snapshot request
    /// loads eagerly if no load has happened by then.
    pub fn new(source: impl RecordSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            published: ArcSwap::from_pointee(Published::initial()),
            last_reload: Mutex::new(None),
            load_lock: Mutex::new(()),
        }
    }

    /// Reads the source and publishes the result.
    ///
    /// Never fails: a source failure publishes an empty dataset and marks the
    /// store unavailable until a later load succeeds.
    pub fn load(&self) -> LoadOutcome {
        let Some(_guard) = self.load_lock.try_lock() else {
            tracing::debug!(source = %self.source.name(), "store: load already in flight; skipping");
            return LoadOutcome::Skipped;
        };
        self.load_locked()
    }

    /// Forces a fresh load and stamps the reload time, whether or not the
    /// load succeeded. A skipped reload leaves the stamp alone.
    pub fn reload(&self) -> LoadOutcome {
        let Some(_guard) = self.load_lock.try_lock() else {
            tracing::debug!(source = %self.source.name(), "store: reload already in flight; skipping");
            return LoadOutcome::Skipped;
        };
        let outcome = self.load_locked();
        *self.last_reload.lock() = Some(Utc::now());
        outcome
    }

    /// Returns the current snapshot, loading first if nothing was ever loaded.
    pub fn current_snapshot(&self) -> Arc<Dataset> {
        if !self.published.load().attempted {
            let _guard = self.load_lock.lock();
            // Another caller may have finished the first load while we waited.
            if !self.published.load().attempted {
                self.load_locked();
            }
        }
        Arc::clone(&self.published.load().dataset)
    }

    /// `true` once any load has finished, so [`Self::current_snapshot`] will
    /// not touch the source.
    pub fn load_attempted(&self) -> bool {
        self.published.load().attempted
    }

    /// `true` iff the last load succeeded and produced at least one record.
    pub fn is_available(&self) -> bool {
        let published = self.published.load();
        published.loaded && !published.dataset.is_empty()
    }

    /// `true` if no reload has happened yet or `interval` has elapsed since
    /// the last one.
    pub fn due_for_reload(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        let Some(last) = *self.last_reload.lock() else {
            return true;
        };
        match TimeDelta::from_std(interval) {
            Ok(interval) => now.signed_duration_since(last) >= interval,
            Err(_) => false,
        }
    }

    pub fn last_reload(&self) -> Option<DateTime<Utc>> {
        *self.last_reload.lock()
    }

    pub fn status(&self) -> StoreStatus {
        let published = self.published.load();
        StoreStatus {
            available: published.loaded && !published.dataset.is_empty(),
            records: published.dataset.len(),
            dropped_rows: published.dropped_rows,
            last_error: published.last_error.clone(),
            last_reload: *self.last_reload.lock(),
            built_at: published.loaded.then(|| published.dataset.built_at()),
        }
    }

    /// Caller must hold `load_lock`.
    fn load_locked(&self) -> LoadOutcome {
        let source_name = self.source.name();

        let read = match self.source.read_rows() {
            Ok(read) => read,
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!(source = %source_name, error = %e, "store: source unavailable; publishing empty dataset");
                self.published.store(Arc::new(Published {
                    dataset: Arc::new(Dataset::empty()),
                    attempted: true,
                    loaded: false,
                    dropped_rows: 0,
                    last_error: Some(reason.clone()),
                }));
                return LoadOutcome::SourceUnavailable { reason };
            }
        };

        let mapped = map_rows(&read.rows);
        let records = mapped.records.len();
        let dropped_rows = mapped.dropped + read.unreadable;
        if dropped_rows > 0 {
            tracing::warn!(
                source = %source_name,
                dropped = dropped_rows,
                unreadable = read.unreadable,
                "store: rows dropped while loading"
            );
        }

        self.published.store(Arc::new(Published {
            dataset: Arc::new(Dataset::new(mapped.records)),
            attempted: true,
            loaded: true,
            dropped_rows,
            last_error: None,
        }));
        tracing::info!(source = %source_name, records, dropped = dropped_rows, "store: dataset published");

        LoadOutcome::Loaded {
            records,
            dropped_rows,
        }
    }
}
