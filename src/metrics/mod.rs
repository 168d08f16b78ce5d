//! Request counters for registry fetches and cone searches.
//!
//! Clones share the same counters, so a client and every task spawned from it
//! report into one place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a remote request was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Catalog database document
    Registry,

    /// Cone search against an access URL
    ConeSearch,
}

#[derive(Debug, Default)]
struct RequestCounters {
    requests: AtomicU64,
    errors: AtomicU64,
    duration_ms: AtomicU64,
}

impl RequestCounters {
    fn record(&self, duration: Duration, failed: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.duration_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        if failed {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn snapshot(&self) -> RequestStats {
        let requests = self.requests.load(Ordering::Relaxed);
        let total_ms = self.duration_ms.load(Ordering::Relaxed);
        RequestStats {
            requests,
            errors: self.errors.load(Ordering::Relaxed),
            total_ms,
            avg_ms: if requests == 0 {
                0.0
            } else {
                total_ms as f64 / requests as f64
            },
        }
    }

    fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.duration_ms.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
struct Counters {
    registry: RequestCounters,
    cone_search: RequestCounters,
    rows_fetched: AtomicU64,
}

impl Counters {
    fn by_kind(&self, kind: RequestKind) -> &RequestCounters {
        match kind {
            RequestKind::Registry => &self.registry,
            RequestKind::ConeSearch => &self.cone_search,
        }
    }
}

/// Metrics collector for remote VO operations.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    counters: Arc<Counters>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished request.
    pub fn record_request(&self, kind: RequestKind, duration: Duration, failed: bool) {
        self.counters.by_kind(kind).record(duration, failed);
    }

    /// Record rows received from a cone search.
    pub fn record_rows_fetched(&self, count: usize) {
        self.counters
            .rows_fetched
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Statistics for one kind of request.
    pub fn requests(&self, kind: RequestKind) -> RequestStats {
        self.counters.by_kind(kind).snapshot()
    }

    /// Requests of every kind.
    pub fn http_requests_total(&self) -> u64 {
        self.requests(RequestKind::Registry).requests
            + self.requests(RequestKind::ConeSearch).requests
    }

    /// Failed requests of every kind.
    pub fn http_errors_total(&self) -> u64 {
        self.requests(RequestKind::Registry).errors
            + self.requests(RequestKind::ConeSearch).errors
    }

    pub fn rows_fetched_total(&self) -> u64 {
        self.counters.rows_fetched.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.counters.registry.reset();
        self.counters.cone_search.reset();
        self.counters.rows_fetched.store(0, Ordering::Relaxed);
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            registry: self.requests(RequestKind::Registry),
            cone_search: self.requests(RequestKind::ConeSearch),
            rows_fetched_total: self.rows_fetched_total(),
        }
    }
}

/// Counters for one kind of request at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestStats {
    pub requests: u64,
    pub errors: u64,
    pub total_ms: u64,
    pub avg_ms: f64,
}

/// A snapshot of all metrics.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub registry: RequestStats,
    pub cone_search: RequestStats,
    pub rows_fetched_total: u64,
}

/// Times one request and records it when finished.
pub struct HttpTimer {
    start: Instant,
    kind: RequestKind,
    metrics: Metrics,
}

impl HttpTimer {
    pub fn start(metrics: Metrics, kind: RequestKind) -> Self {
        Self {
            start: Instant::now(),
            kind,
            metrics,
        }
    }

    /// Record a successful request; returns how long it took.
    pub fn complete(self) -> Duration {
        self.finish(false)
    }

    /// Record a failed request; returns how long it took.
    pub fn complete_with_error(self) -> Duration {
        self.finish(true)
    }

    fn finish(self, failed: bool) -> Duration {
        let duration = self.start.elapsed();
        self.metrics.record_request(self.kind, duration, failed);
        duration
    }
}
