//! Single-Flight Module
//!
//! Collapses concurrent loads of the same key into one execution.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

// == Single Flight ==
/// Per-key request de-duplication.
///
/// The first caller for a key becomes the leader and runs the work; callers
/// arriving while it is in flight wait on the same cell and receive a clone of
/// its result. Keys are independent and proceed in parallel.
///
/// If the leader is cancelled before finishing, one of the waiters takes over
/// the work.
pub struct SingleFlight<T> {
    calls: Mutex<HashMap<String, Arc<OnceCell<T>>>>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone> SingleFlight<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Runs `work` for `key` unless an identical call is already in flight,
    /// in which case its result is shared.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let cell = {
            let mut calls = self.calls.lock();
            Arc::clone(
                calls
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(OnceCell::new())),
            )
        };

        let guard = FlightGuard {
            calls: &self.calls,
            key,
            cell,
        };
        let value = guard.cell.get_or_init(work).await.clone();
        drop(guard);
        value
    }

    /// Number of keys with a call currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Releases a caller's hold on its key's cell, also when the caller is
/// cancelled mid-flight.
///
/// The entry is removed once the cell holds a value, or when the last holder
/// of an unfinished cell goes away. An unfinished cell with other waiters
/// stays, and one of them runs the work instead.
struct FlightGuard<'a, T> {
    calls: &'a Mutex<HashMap<String, Arc<OnceCell<T>>>>,
    key: &'a str,
    cell: Arc<OnceCell<T>>,
}

impl<T> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        let mut calls = self.calls.lock();
        let current = calls
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.cell));
        // New holders only clone under the map lock: the map plus this guard is 2.
        if current && (self.cell.initialized() || Arc::strong_count(&self.cell) == 2) {
            calls.remove(self.key);
        }
    }
}
