//! Cone searches running on a background runtime.
//!
//! A search is submitted when the handle is created and runs on a dedicated
//! tokio runtime owned by this module, so callers never block on submission and
//! never need a runtime of their own. The handle offers a non-blocking
//! [`done`](AsyncConeSearch::done) poll and a blocking
//! [`get`](AsyncConeSearch::get) bounded by an optional timeout.
//!
//! A timed-out `get` stops waiting but not the request itself; the search keeps
//! running to completion and its result stays available to a later `get`.
//!
//! A panicking search is reported as `VoError::Task` only when panics unwind.
//! The release profile sets `panic = "abort"`, so there a panic ends the process.

use crate::conesearch::{CatalogSelector, ConeSearch, SearchOptions};
use crate::error::{VoError, VoResult};
use crate::models::{ConeQuery, SearchResult};
use futures::FutureExt;
use once_cell::sync::Lazy;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

static BACKGROUND_RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("vo-background")
        .enable_all()
        .build()
        .expect("Failed to build background runtime")
});

/// Lifecycle of a background search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Submitted, not yet started
    Pending,

    /// Executing
    Running,

    /// Finished with a result
    Done,

    /// Finished with an error
    Failed,
}

struct Slot<T> {
    state: TaskState,
    result: Option<VoResult<T>>,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    finished: Condvar,
}

impl<T> Shared<T> {
    fn set_running(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.state = TaskState::Running;
        }
    }

    fn finish(&self, result: VoResult<T>) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.state = if result.is_ok() {
                TaskState::Done
            } else {
                TaskState::Failed
            };
            slot.result = Some(result);
        }
        self.finished.notify_all();
    }
}

/// Handle to one piece of background work producing `T`.
pub struct BackgroundTask<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> BackgroundTask<T> {
    fn new_shared() -> Arc<Shared<T>> {
        Arc::new(Shared {
            slot: Mutex::new(Slot {
                state: TaskState::Pending,
                result: None,
            }),
            finished: Condvar::new(),
        })
    }

    /// Run blocking work on the background runtime's blocking pool.
    pub fn spawn_blocking<F>(work: F) -> Self
    where
        F: FnOnce() -> VoResult<T> + Send + 'static,
    {
        let shared = Self::new_shared();
        let task_shared = Arc::clone(&shared);

        BACKGROUND_RUNTIME.spawn_blocking(move || {
            task_shared.set_running();
            let result = std::panic::catch_unwind(AssertUnwindSafe(work))
                .unwrap_or_else(|_| Err(VoError::Task("search panicked".to_string())));
            task_shared.finish(result);
        });

        Self { shared }
    }

    /// Run async work on the background runtime.
    pub fn spawn<Fut>(work: Fut) -> Self
    where
        Fut: Future<Output = VoResult<T>> + Send + 'static,
    {
        let shared = Self::new_shared();
        let task_shared = Arc::clone(&shared);

        BACKGROUND_RUNTIME.spawn(async move {
            task_shared.set_running();
            let result = AssertUnwindSafe(work)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(VoError::Task("search panicked".to_string())));
            task_shared.finish(result);
        });

        Self { shared }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        match self.shared.slot.lock() {
            Ok(slot) => slot.state,
            Err(_) => TaskState::Failed,
        }
    }

    /// Has the work finished (successfully or not)? Never blocks on the work.
    pub fn done(&self) -> bool {
        matches!(self.state(), TaskState::Done | TaskState::Failed)
    }

    /// Wait for the result.
    ///
    /// `None` waits indefinitely. If `timeout` elapses first, returns
    /// `VoError::Timeout`. A finished task returns the same result on every call.
    pub fn get(&self, timeout: Option<Duration>) -> VoResult<T> {
        let poisoned = |_| VoError::Task("result lock poisoned".to_string());
        let slot = self.shared.slot.lock().map_err(poisoned)?;
        let pending = |slot: &mut Slot<T>| slot.result.is_none();

        let slot = match timeout {
            Some(limit) => {
                let (slot, wait) = self
                    .shared
                    .finished
                    .wait_timeout_while(slot, limit, pending)
                    .map_err(|_| VoError::Task("result lock poisoned".to_string()))?;
                if wait.timed_out() && slot.result.is_none() {
                    return Err(VoError::Timeout(limit));
                }
                slot
            }
            None => self
                .shared
                .finished
                .wait_while(slot, pending)
                .map_err(|_| VoError::Task("result lock poisoned".to_string()))?,
        };

        slot.result
            .clone()
            .unwrap_or_else(|| Err(VoError::Task("finished without a result".to_string())))
    }

    /// Request cancellation.
    ///
    /// Cancellation is not supported: the work always runs to completion.
    /// Returns `false` to say nothing was cancelled.
    pub fn cancel(&self) -> bool {
        false
    }
}

/// A single cone search running in the background.
pub struct AsyncConeSearch {
    task: BackgroundTask<SearchResult>,
}

impl AsyncConeSearch {
    /// Submit `searcher.conesearch(query, catalog_db, options)`; returns immediately.
    pub fn new(
        searcher: &ConeSearch,
        query: ConeQuery,
        catalog_db: impl Into<CatalogSelector>,
        options: SearchOptions,
    ) -> Self {
        let searcher = searcher.clone();
        let selector = catalog_db.into();
        let task = BackgroundTask::spawn_blocking(move || {
            searcher.conesearch(&query, selector, options)
        });
        Self { task }
    }

    pub fn state(&self) -> TaskState {
        self.task.state()
    }

    pub fn done(&self) -> bool {
        self.task.done()
    }

    /// Wait up to `timeout` for the search result.
    pub fn get(&self, timeout: Option<Duration>) -> VoResult<SearchResult> {
        self.task.get(timeout)
    }

    /// Always `false`; see [`BackgroundTask::cancel`].
    pub fn cancel(&self) -> bool {
        self.task.cancel()
    }
}

/// `search_all` running in the background.
pub struct AsyncSearchAll {
    task: BackgroundTask<Vec<SearchResult>>,
}

impl AsyncSearchAll {
    /// Submit `searcher.search_all_async(query, catalog_db, options)`; returns immediately.
    pub fn new(
        searcher: &ConeSearch,
        query: ConeQuery,
        catalog_db: impl Into<CatalogSelector>,
        options: SearchOptions,
    ) -> Self {
        let searcher = searcher.clone();
        let selector: CatalogSelector = catalog_db.into();
        let task = BackgroundTask::spawn(async move {
            searcher.search_all_async(&query, selector, options).await
        });
        Self { task }
    }

    pub fn state(&self) -> TaskState {
        self.task.state()
    }

    pub fn done(&self) -> bool {
        self.task.done()
    }

    /// Wait up to `timeout` for all searches to finish.
    pub fn get(&self, timeout: Option<Duration>) -> VoResult<Vec<SearchResult>> {
        self.task.get(timeout)
    }

    /// Always `false`; see [`BackgroundTask::cancel`].
    pub fn cancel(&self) -> bool {
        self.task.cancel()
    }
}

impl ConeSearch {
    /// Start a cone search in the background.
    pub fn conesearch_async(
        &self,
        query: ConeQuery,
        catalog_db: impl Into<CatalogSelector>,
        options: SearchOptions,
    ) -> AsyncConeSearch {
        AsyncConeSearch::new(self, query, catalog_db, options)
    }

    /// Query every candidate concurrently, blocking until all have answered.
    pub fn search_all(
        &self,
        query: &ConeQuery,
        catalog_db: impl Into<CatalogSelector>,
        options: SearchOptions,
    ) -> VoResult<Vec<SearchResult>> {
        AsyncSearchAll::new(self, *query, catalog_db, options).get(None)
    }
}
