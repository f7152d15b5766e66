use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::error;

use crate::metrics::LISTENER_PANICS_METRIC;
use crate::IngredientInstance;
use crate::StorageChangeEvent;

/// Receives every change event the engine detects.
///
/// Callbacks run on the designated execution context (or, with
/// multithreading disabled, on the thread driving the tick). A callback may
/// subscribe, unsubscribe or record position removals, but must not drive
/// the engine's tick itself.
pub trait IndexChangeObserver<I>: Send + Sync + 'static
where I: IngredientInstance
{
    fn on_change(
        &self,
        event: &StorageChangeEvent<I>,
    );
}

/// Token identifying one registration.
///
/// Subscribing the same listener value twice yields two distinct handles and
/// two deliveries per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

type ListenerEntry<I> = (ListenerHandle, Arc<dyn IndexChangeObserver<I>>);

/// Handle-keyed listener table.
///
/// Reads load a snapshot and never block writers; writers serialize on a
/// mutex and publish a rebuilt snapshot. An unsubscribe during an in-flight
/// dispatch therefore only affects later dispatches: the running one keeps
/// the snapshot it started with.
pub struct ListenerRegistry<I>
where I: IngredientInstance
{
    snapshot: ArcSwap<Vec<ListenerEntry<I>>>,
    write_lock: Mutex<()>,
    next_handle: AtomicU64,
}

impl<I> ListenerRegistry<I>
where I: IngredientInstance
{
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Vec::new()),
            write_lock: Mutex::new(()),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn subscribe(
        &self,
        listener: Arc<dyn IndexChangeObserver<I>>,
    ) -> ListenerHandle {
        let handle = ListenerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let _guard = self.write_lock.lock();
        let mut entries = Vec::clone(&self.snapshot.load_full());
        entries.push((handle, listener));
        self.snapshot.store(Arc::new(entries));

        debug!("listener {:?} subscribed", handle);
        handle
    }

    /// Removes one registration. Unknown or stale handles are a no-op.
    pub fn unsubscribe(
        &self,
        handle: ListenerHandle,
    ) -> bool {
        let _guard = self.write_lock.lock();
        let entries = self.snapshot.load();
        if !entries.iter().any(|(h, _)| *h == handle) {
            return false;
        }

        let remaining: Vec<ListenerEntry<I>> =
            entries.iter().filter(|(h, _)| *h != handle).cloned().collect();
        self.snapshot.store(Arc::new(remaining));

        debug!("listener {:?} unsubscribed", handle);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    /// Deliver one event to the current snapshot of listeners.
    ///
    /// A panicking listener is caught, logged and counted; delivery
    /// continues with the remaining listeners.
    pub fn notify_all(
        &self,
        event: &StorageChangeEvent<I>,
    ) {
        let entries = self.snapshot.load();
        for (handle, listener) in entries.iter() {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener.on_change(event))) {
                LISTENER_PANICS_METRIC.with_label_values(&["on_change"]).inc();
                error!(
                    "listener {:?} panicked while handling {:?} event at {:?}: {}",
                    handle,
                    event.change,
                    event.pos,
                    panic_message(&panic)
                );
            }
        }
    }
}

impl<I> Default for ListenerRegistry<I>
where I: IngredientInstance
{
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
