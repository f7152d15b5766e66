#![allow(dead_code)]

//! Shared fixtures for the integration suite: a simulated storage network
//! driven through the engine's public API only.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use o_engine::ChannelId;
use o_engine::ContextScheduler;
use o_engine::DurationIndex;
use o_engine::IndexChangeObserver;
use o_engine::IngredientInstance;
use o_engine::IngredientObserver;
use o_engine::InventoryStateProbe;
use o_engine::ObserverConfig;
use o_engine::ObserverTypeConfig;
use o_engine::PartPos;
use o_engine::PrioritizedPartPos;
use o_engine::ScheduledTask;
use o_engine::StorageChangeEvent;
use o_engine::StorageNetwork;
use parking_lot::Mutex;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    env_logger::init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// Item fixture keyed by a static name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimIngredient {
    pub name: &'static str,
    pub quantity: u64,
}

impl SimIngredient {
    pub fn new(
        name: &'static str,
        quantity: u64,
    ) -> Self {
        Self { name, quantity }
    }
}

impl IngredientInstance for SimIngredient {
    type Key = &'static str;

    fn key(&self) -> Self::Key {
        self.name
    }

    fn quantity(&self) -> u64 {
        self.quantity
    }

    fn with_quantity(
        &self,
        quantity: u64,
    ) -> Self {
        Self {
            name: self.name,
            quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct SimTypeConfig;

impl ObserverTypeConfig for SimTypeConfig {
    type I = SimIngredient;

    type N = SimNetwork;

    type SP = SimProbe;

    type C = InlineContext;
}

pub type SimEngine = Arc<IngredientObserver<SimTypeConfig>>;

/// Same world, but deliveries go through the crate's [`DeliveryLoop`] and
/// observation runs on the worker pool as well as inline.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct PooledTypeConfig;

impl ObserverTypeConfig for PooledTypeConfig {
    type I = SimIngredient;

    type N = SimNetwork;

    type SP = SimProbe;

    type C = o_engine::DeliveryLoop;
}

/// Mutable in-memory world the engine observes.
pub struct SimNetwork {
    channels: Mutex<BTreeMap<ChannelId, Vec<PrioritizedPartPos>>>,
    contents: Mutex<HashMap<PartPos, Vec<SimIngredient>>>,
    duration_index: Arc<DurationIndex>,
    raw_reads: AtomicUsize,
    reads_per_pos: Mutex<HashMap<PartPos, usize>>,
}

impl SimNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            channels: Mutex::new(BTreeMap::new()),
            contents: Mutex::new(HashMap::new()),
            duration_index: Arc::new(DurationIndex::new()),
            raw_reads: AtomicUsize::new(0),
            reads_per_pos: Mutex::new(HashMap::new()),
        })
    }

    pub fn add_position(
        &self,
        channel: ChannelId,
        pos: PrioritizedPartPos,
    ) {
        self.channels.lock().entry(channel).or_default().push(pos);
    }

    pub fn remove_position(
        &self,
        channel: ChannelId,
        pos: PrioritizedPartPos,
    ) {
        if let Some(positions) = self.channels.lock().get_mut(&channel) {
            positions.retain(|candidate| *candidate != pos);
        }
        self.contents.lock().remove(&pos.part_pos);
    }

    pub fn set_instances(
        &self,
        pos: PartPos,
        instances: Vec<SimIngredient>,
    ) {
        self.contents.lock().insert(pos, instances);
    }

    pub fn instances(
        &self,
        pos: PartPos,
    ) -> Vec<SimIngredient> {
        self.contents.lock().get(&pos).cloned().unwrap_or_default()
    }

    pub fn raw_reads(&self) -> usize {
        self.raw_reads.load(Ordering::SeqCst)
    }

    pub fn reads_at(
        &self,
        pos: PartPos,
    ) -> usize {
        self.reads_per_pos.lock().get(&pos).copied().unwrap_or(0)
    }
}

impl<T> StorageNetwork<T> for SimNetwork
where T: ObserverTypeConfig<I = SimIngredient>
{
    fn channels(&self) -> Vec<ChannelId> {
        self.channels.lock().keys().copied().collect()
    }

    fn prioritized_positions(
        &self,
        channel: ChannelId,
    ) -> Vec<PrioritizedPartPos> {
        self.channels.lock().get(&channel).cloned().unwrap_or_default()
    }

    fn raw_instances(
        &self,
        pos: PartPos,
    ) -> Vec<SimIngredient> {
        self.raw_reads.fetch_add(1, Ordering::SeqCst);
        *self.reads_per_pos.lock().entry(pos).or_insert(0) += 1;
        self.contents.lock().get(&pos).cloned().unwrap_or_default()
    }

    fn duration_index(&self) -> Arc<DurationIndex> {
        self.duration_index.clone()
    }
}

pub struct SimProbe {
    hashes: Mutex<HashMap<PartPos, u64>>,
}

impl SimProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            hashes: Mutex::new(HashMap::new()),
        })
    }

    pub fn set_hash(
        &self,
        pos: PartPos,
        hash: u64,
    ) {
        self.hashes.lock().insert(pos, hash);
    }
}

impl InventoryStateProbe for SimProbe {
    fn state_hash(
        &self,
        pos: PartPos,
    ) -> Option<u64> {
        self.hashes.lock().get(&pos).copied()
    }
}

/// Runs scheduled deliveries on the spot; the single-threaded suite's
/// stand-in for the designated execution context.
pub struct InlineContext;

impl InlineContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl ContextScheduler for InlineContext {
    fn schedule(
        &self,
        task: ScheduledTask,
    ) {
        task();
    }
}

/// Records every delivered event.
pub struct EventLog {
    events: Mutex<Vec<StorageChangeEvent<SimIngredient>>>,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<StorageChangeEvent<SimIngredient>> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }
}

impl IndexChangeObserver<SimIngredient> for EventLog {
    fn on_change(
        &self,
        event: &StorageChangeEvent<SimIngredient>,
    ) {
        self.events.lock().push(event.clone());
    }
}

pub fn build_engine(
    config: ObserverConfig
) -> (SimEngine, Arc<SimNetwork>, Arc<SimProbe>) {
    let network = SimNetwork::new();
    let probe = SimProbe::new();
    let engine = Arc::new(IngredientObserver::new(
        network.clone(),
        probe.clone(),
        InlineContext::new(),
        Arc::new(config),
    ));
    (engine, network, probe)
}
