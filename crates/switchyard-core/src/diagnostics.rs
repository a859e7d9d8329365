//! Process-scoped diagnostics context.
//!
//! `Diagnostics` is created once at startup and handed explicitly to the bus,
//! the lifecycle manager, and components. It holds a shared string map that
//! components may write into (e.g. deployment id -> worker thread) and a few
//! counters for events that are deliberately not errors: dropped publishes,
//! duplicate replies, unanswered requests, consumer panics, failed starts.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

#[derive(Default)]
struct DiagnosticsInner {
    shared: DashMap<String, String>,
    dropped_publishes: AtomicU64,
    protocol_violations: AtomicU64,
    unanswered_requests: AtomicU64,
    consumer_panics: AtomicU64,
    start_failures: AtomicU64,
}

/// Cheaply cloneable handle to the diagnostics context.
#[derive(Clone, Default)]
pub struct Diagnostics {
    inner: Arc<DiagnosticsInner>,
}

/// Point-in-time copy of the diagnostics counters and shared map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsSnapshot {
    pub shared: Vec<(String, String)>,
    pub dropped_publishes: u64,
    pub protocol_violations: u64,
    pub unanswered_requests: u64,
    pub consumer_panics: u64,
    pub start_failures: u64,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value in the shared map, returning the previous one.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.inner.shared.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.shared.get(key).map(|v| v.value().clone())
    }

    pub(crate) fn record_dropped_publish(&self) {
        self.inner.dropped_publishes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_protocol_violation(&self) {
        self.inner.protocol_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unanswered_request(&self) {
        self.inner.unanswered_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_consumer_panic(&self) {
        self.inner.consumer_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_start_failure(&self) {
        self.inner.start_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn protocol_violations(&self) -> u64 {
        self.inner.protocol_violations.load(Ordering::Relaxed)
    }

    pub fn dropped_publishes(&self) -> u64 {
        self.inner.dropped_publishes.load(Ordering::Relaxed)
    }

    pub fn unanswered_requests(&self) -> u64 {
        self.inner.unanswered_requests.load(Ordering::Relaxed)
    }

    pub fn consumer_panics(&self) -> u64 {
        self.inner.consumer_panics.load(Ordering::Relaxed)
    }

    pub fn start_failures(&self) -> u64 {
        self.inner.start_failures.load(Ordering::Relaxed)
    }

    /// Copy the current state; shared entries are sorted by key.
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let mut shared: Vec<(String, String)> = self
            .inner
            .shared
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        shared.sort();

        DiagnosticsSnapshot {
            shared,
            dropped_publishes: self.dropped_publishes(),
            protocol_violations: self.protocol_violations(),
            unanswered_requests: self.unanswered_requests(),
            consumer_panics: self.consumer_panics(),
            start_failures: self.start_failures(),
        }
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("shared_entries", &self.inner.shared.len())
            .field("protocol_violations", &self.protocol_violations())
            .field("start_failures", &self.start_failures())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let diagnostics = Diagnostics::new();
        let clone = diagnostics.clone();

        clone.put("deployment-1", "worker-0");
        clone.record_protocol_violation();

        assert_eq!(diagnostics.get("deployment-1").as_deref(), Some("worker-0"));
        assert_eq!(diagnostics.protocol_violations(), 1);
    }

    #[test]
    fn put_returns_previous_value() {
        let diagnostics = Diagnostics::new();
        assert_eq!(diagnostics.put("k", "a"), None);
        assert_eq!(diagnostics.put("k", "b").as_deref(), Some("a"));
    }

    #[test]
    fn snapshot_sorts_shared_entries() {
        let diagnostics = Diagnostics::new();
        diagnostics.put("b", "2");
        diagnostics.put("a", "1");
        diagnostics.record_dropped_publish();
        diagnostics.record_start_failure();
        diagnostics.record_unanswered_request();
        diagnostics.record_consumer_panic();

        let snapshot = diagnostics.snapshot();
        assert_eq!(
            snapshot.shared,
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
        assert_eq!(snapshot.dropped_publishes, 1);
        assert_eq!(snapshot.start_failures, 1);
        assert_eq!(snapshot.unanswered_requests, 1);
        assert_eq!(snapshot.consumer_panics, 1);
        assert_eq!(snapshot.protocol_violations, 0);
    }
}
