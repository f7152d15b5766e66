use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;

use super::diff::IngredientDiff;
use super::diff::IngredientDiffManager;
use super::event::StorageChangeEvent;
use super::frequency::FrequencyTracker;
use crate::alias::COF;
use crate::alias::IOF;
use crate::alias::NOF;
use crate::alias::SPOF;
use crate::diagnostics::NetworkDiagnostics;
use crate::metrics::CHANGE_EVENTS_METRIC;
use crate::metrics::DIFFED_POSITIONS_METRIC;
use crate::metrics::SKIPPED_POSITIONS_METRIC;
use crate::Change;
use crate::ChannelId;
use crate::ContextScheduler;
use crate::IndexChangeObserver;
use crate::InventoryStateProbe;
use crate::ListenerHandle;
use crate::ListenerRegistry;
use crate::ObserverConfig;
use crate::ObserverTypeConfig;
use crate::PartPos;
use crate::PrioritizedPartPos;
use crate::Result;
use crate::StorageNetwork;
use crate::WorkerPool;

/// One channel's diff and scheduling state, guarded as a unit.
///
/// The mutex around this struct is the per-channel synchronization point:
/// a channel pass holds it from the position loop through the removal
/// drain, so the inline pass and a pooled pass over the same channel never
/// interleave their table accesses.
struct ChannelState<I>
where I: crate::IngredientInstance
{
    diff_managers: HashMap<PartPos, IngredientDiffManager<I>>,
    frequencies: FrequencyTracker,
}

impl<I> ChannelState<I>
where I: crate::IngredientInstance
{
    fn new() -> Self {
        Self {
            diff_managers: HashMap::new(),
            frequencies: FrequencyTracker::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.diff_managers.is_empty() && self.frequencies.is_empty()
    }
}

/// The adaptive change-observation engine.
///
/// Driven by an external clock through [`observe`](Self::observe), one call
/// per tick. Each tick it walks every channel the network reports, diffs the
/// positions that are due, emits change events to subscribed listeners and
/// retunes each position's re-check interval from what it found: volatile
/// positions converge toward `frequency_min` (checked almost every tick),
/// quiet ones toward `frequency_max`.
///
/// With `enable_multithreading` on, each channel is additionally submitted
/// to the owned worker pool before the calling thread processes it inline.
/// The inline pass always runs; the pooled pass is additive, a deliberate
/// policy carried from the system this engine models. Event delivery then
/// goes through the context scheduler so listener code only ever runs on the
/// designated execution context.
///
/// Listener callbacks may subscribe, unsubscribe or call
/// [`on_position_removed`](Self::on_position_removed); calling `observe`
/// from a callback is not supported.
pub struct IngredientObserver<T>
where T: ObserverTypeConfig
{
    network: Arc<NOF<T>>,
    state_probe: Arc<SPOF<T>>,
    context: Arc<COF<T>>,
    config: Arc<ObserverConfig>,

    listeners: Arc<ListenerRegistry<IOF<T>>>,

    // Per-channel state; one lock per channel covers a whole pass
    channels: DashMap<ChannelId, Arc<Mutex<ChannelState<IOF<T>>>>>,
    removal_queues: DashMap<ChannelId, Vec<PrioritizedPartPos>>,
    inventory_states: DashMap<PartPos, u64>,

    diagnostics: Arc<NetworkDiagnostics>,

    // Present only with multithreading enabled
    worker_pool: Option<WorkerPool>,

    // Written by observe(), read by pooled channel passes; a straggling
    // pooled pass may therefore observe a newer tick than the one it was
    // submitted under
    current_tick: AtomicU64,
}

impl<T> IngredientObserver<T>
where T: ObserverTypeConfig
{
    /// With `enable_multithreading` set, spawns the worker pool and must
    /// therefore be called inside a tokio runtime.
    pub fn new(
        network: Arc<NOF<T>>,
        state_probe: Arc<SPOF<T>>,
        context: Arc<COF<T>>,
        config: Arc<ObserverConfig>,
    ) -> Self {
        let worker_pool = config
            .dispatch
            .enable_multithreading
            .then(|| WorkerPool::new(config.dispatch.worker_threads));

        Self {
            network,
            state_probe,
            context,
            config,
            listeners: Arc::new(ListenerRegistry::new()),
            channels: DashMap::new(),
            removal_queues: DashMap::new(),
            inventory_states: DashMap::new(),
            diagnostics: Arc::new(NetworkDiagnostics::new()),
            worker_pool,
            current_tick: AtomicU64::new(0),
        }
    }

    /// Registers a listener for every future change event.
    ///
    /// Registrations are independent: subscribing the same listener value
    /// twice yields two handles and two deliveries per event.
    pub fn subscribe(
        &self,
        listener: Arc<dyn IndexChangeObserver<IOF<T>>>,
    ) -> ListenerHandle {
        self.listeners.subscribe(listener)
    }

    /// Removes one registration. Unknown or stale handles are a no-op.
    pub fn unsubscribe(
        &self,
        handle: ListenerHandle,
    ) -> bool {
        self.listeners.unsubscribe(handle)
    }

    /// Records that a position left the channel, so its retained state gets
    /// a final deletion pass on the next tick even though the position no
    /// longer appears in the network's snapshot.
    ///
    /// Idempotent per pass: duplicate records only cause redundant empty
    /// diffs during the drain.
    pub fn on_position_removed(
        &self,
        channel: ChannelId,
        pos: PrioritizedPartPos,
    ) {
        self.removal_queues.entry(channel).or_default().push(pos);
        trace!("position {:?} queued for removal from channel {}", pos.part_pos, channel);
    }

    /// Diagnostics sessions control whether per-position observation timing
    /// is accumulated into the network's duration index.
    pub fn diagnostics(&self) -> &Arc<NetworkDiagnostics> {
        &self.diagnostics
    }

    /// One tick of the external clock.
    ///
    /// With no listeners registered this returns without touching the
    /// network. Otherwise every reported channel is processed inline on the
    /// calling thread and, with multithreading enabled, additionally
    /// submitted to the worker pool first.
    pub fn observe(
        self: &Arc<Self>,
        current_tick: u64,
    ) {
        if self.listeners.is_empty() {
            trace!("tick {}: no listeners, skipping observation", current_tick);
            return;
        }

        self.current_tick.store(current_tick, Ordering::SeqCst);

        for channel in self.network.channels() {
            if let Some(pool) = &self.worker_pool {
                let engine = Arc::clone(self);
                pool.execute(move || engine.observe_channel(channel));
            }
            self.observe_channel(channel);
        }
    }

    /// One pass over one channel at the engine's current tick.
    pub(crate) fn observe_channel(
        &self,
        channel: ChannelId,
    ) {
        let current_tick = self.current_tick.load(Ordering::SeqCst);

        // Timing data from a closed diagnostics session must not linger.
        let duration_index = self.network.duration_index();
        let diagnose = self.diagnostics.is_active();
        if !diagnose && !duration_index.is_empty() {
            debug!("diagnostics inactive, clearing stale duration index");
            duration_index.clear();
        }

        let state = self
            .channels
            .entry(channel)
            .or_insert_with(|| Arc::new(Mutex::new(ChannelState::new())))
            .clone();
        let mut state = state.lock();

        let mut positions = self.network.prioritized_positions(channel);
        positions.sort_by(PrioritizedPartPos::iteration_cmp);

        for prioritized in positions {
            let pos = prioritized.part_pos;
            let started = diagnose.then(Instant::now);

            if state.frequencies.is_due(&pos, current_tick) {
                self.check_position(channel, pos, current_tick, &mut state);
            } else {
                SKIPPED_POSITIONS_METRIC.with_label_values(&["not_due"]).inc();
            }

            if let Some(started) = started {
                duration_index.accumulate(pos.target(), started.elapsed());
            }
        }

        self.drain_removals(channel, &mut state);

        // Compact: a channel whose tables are all back at their defaults
        // costs no memory. try_lock guards against a concurrent pass that
        // re-populated the state between our unlock and the remove.
        let now_empty = state.is_empty();
        drop(state);
        if now_empty {
            self.channels
                .remove_if(&channel, |_, state| state.try_lock().is_some_and(|guard| guard.is_empty()));
        }
    }

    /// Diff one due position and retune its interval, unless the fast-change
    /// hash says nothing moved.
    fn check_position(
        &self,
        channel: ChannelId,
        pos: PartPos,
        current_tick: u64,
        state: &mut ChannelState<IOF<T>>,
    ) {
        if self.state_hash_unchanged(pos) {
            // No event, no interval change, no tick-table write: the
            // position stays due every tick until its hash moves or a
            // full diff reschedules it.
            SKIPPED_POSITIONS_METRIC.with_label_values(&["unchanged_hash"]).inc();
            trace!("position {:?} unchanged by state hash, skipping diff", pos);
            return;
        }

        let diff = state
            .diff_managers
            .entry(pos)
            .or_default()
            .on_change(self.network.raw_instances(pos));
        DIFFED_POSITIONS_METRIC.with_label_values(&[&channel.to_string()]).inc();

        self.emit_diff(channel, pos, &diff);

        let interval =
            state
                .frequencies
                .on_observed(pos, current_tick, diff.has_changes(), &self.config.frequency);
        trace!(
            "channel {} position {:?}: changes={}, next interval {}",
            channel,
            pos,
            diff.has_changes(),
            interval
        );
    }

    /// True when the position exposes a state hash and it matches the cached
    /// one. A new or changed hash replaces the cache entry and reports
    /// false; a position without the capability always reports false.
    fn state_hash_unchanged(
        &self,
        pos: PartPos,
    ) -> bool {
        let Some(hash) = self.state_probe.state_hash(pos) else {
            return false;
        };

        if self.inventory_states.get(&pos).map(|cached| *cached) == Some(hash) {
            return true;
        }
        self.inventory_states.insert(pos, hash);
        false
    }

    /// Final deletion pass for positions recorded as removed since the last
    /// drain of this channel.
    ///
    /// The queue is taken whole, so removals recorded reentrantly by a
    /// listener callback land in a fresh queue for the next pass.
    fn drain_removals(
        &self,
        channel: ChannelId,
        state: &mut ChannelState<IOF<T>>,
    ) {
        let Some((_, removed)) = self.removal_queues.remove(&channel) else {
            return;
        };

        for prioritized in removed {
            let pos = prioritized.part_pos;
            if let Some(mut manager) = state.diff_managers.remove(&pos) {
                let diff = manager.on_change(std::iter::empty());
                if diff.has_deletions() {
                    debug!("removed position {:?} still held items, emitting terminal deletion", pos);
                    self.emit(StorageChangeEvent::deletion(channel, pos, true, diff.deletions().to_vec()));
                }
            }
            state.frequencies.forget(&pos);
            self.inventory_states.remove(&pos);
        }
    }

    fn emit_diff(
        &self,
        channel: ChannelId,
        pos: PartPos,
        diff: &IngredientDiff<IOF<T>>,
    ) {
        if diff.has_additions() {
            self.emit(StorageChangeEvent::addition(channel, pos, diff.additions().to_vec()));
        }
        if diff.has_deletions() {
            self.emit(StorageChangeEvent::deletion(
                channel,
                pos,
                diff.is_completely_empty(),
                diff.deletions().to_vec(),
            ));
        }
    }

    /// Deliver one event: directly on the calling thread, or through the
    /// context scheduler when the pooled path is active.
    fn emit(
        &self,
        event: StorageChangeEvent<IOF<T>>,
    ) {
        let kind = match event.change {
            Change::Addition => "addition",
            Change::Deletion => "deletion",
        };
        CHANGE_EVENTS_METRIC.with_label_values(&[kind]).inc();

        if self.config.dispatch.enable_multithreading {
            let listeners = Arc::clone(&self.listeners);
            self.context.schedule(Box::new(move || listeners.notify_all(&event)));
        } else {
            self.listeners.notify_all(&event);
        }
    }

    /// Stops the owned worker pool. Without multithreading this is a no-op.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(pool) = &self.worker_pool {
            pool.shutdown().await?;
        }
        debug!("[IngredientObserver] stopped.");
        Ok(())
    }
}
