//! Dispatch counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every worker of one server
///
/// Once [`Server::run`](super::Server::run) has returned, `accepted()` equals
/// `closed()`.
#[derive(Debug, Default)]
pub struct DispatchStats {
    accepted: AtomicU64,
    closed: AtomicU64,
    handled: AtomicU64,
    handler_failures: AtomicU64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connections returned by accept
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Acquire)
    }

    /// Connections closed by a worker
    pub fn closed(&self) -> u64 {
        self.closed.load(Ordering::Acquire)
    }

    /// Handler invocations that completed successfully
    pub fn handled(&self) -> u64 {
        self.handled.load(Ordering::Acquire)
    }

    /// Handler invocations that returned an error or panicked
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Acquire)
    }

    pub(crate) fn record_accept(&self) {
        self.accepted.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn record_close(&self) {
        self.closed.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn record_handled(&self) {
        self.handled.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::AcqRel);
    }
}
