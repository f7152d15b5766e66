//! Opt-in observation diagnostics.
//!
//! While at least one session is open the engine times every position check
//! and folds the cost into the network's [`DurationIndex`] under the
//! position's target. With no session open the engine clears the index on
//! its next pass, so a closed diagnostics UI never leaves timings behind.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use crate::PartPos;


/// Session counter deciding whether observation timing is recorded.
///
/// Owned by one engine; nothing here is process-global. Sessions are
/// counted, not flagged, so two overlapping diagnostics consumers keep
/// recording active until the last one is done.
pub struct NetworkDiagnostics {
    open_sessions: AtomicUsize,
}

impl NetworkDiagnostics {
    pub fn new() -> Self {
        Self {
            open_sessions: AtomicUsize::new(0),
        }
    }

    /// Opens a recording session, active until the guard drops.
    pub fn begin_session(self: &Arc<Self>) -> DiagnosticsSession {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        debug!("diagnostics session opened");
        DiagnosticsSession {
            diagnostics: self.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.open_sessions.load(Ordering::SeqCst) > 0
    }
}

impl Default for NetworkDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for one open diagnostics session.
pub struct DiagnosticsSession {
    diagnostics: Arc<NetworkDiagnostics>,
}

impl Drop for DiagnosticsSession {
    fn drop(&mut self) {
        self.diagnostics.open_sessions.fetch_sub(1, Ordering::SeqCst);
        debug!("diagnostics session closed");
    }
}

/// Per-target accumulated observation cost.
///
/// Keys are position targets (see [`PartPos::target`]), so the part sitting
/// at a face and the inventory it points at share one slot. The engine only
/// ever accumulates while diagnosed and clears while not; presentation and
/// periodic resets belong to the diagnostics consumer.
pub struct DurationIndex {
    durations: DashMap<PartPos, Duration>,
}

impl DurationIndex {
    pub fn new() -> Self {
        Self {
            durations: DashMap::new(),
        }
    }

    pub fn accumulate(
        &self,
        target: PartPos,
        elapsed: Duration,
    ) {
        *self.durations.entry(target).or_insert(Duration::ZERO) += elapsed;
    }

    pub fn clear(&self) {
        self.durations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn snapshot(&self) -> Vec<(PartPos, Duration)> {
        self.durations
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }
}

impl Default for DurationIndex {
    fn default() -> Self {
        Self::new()
    }
}
