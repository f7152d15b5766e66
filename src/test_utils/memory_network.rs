use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::diagnostics::DurationIndex;
use crate::test_utils::TestIngredient;
use crate::ChannelId;
use crate::ContextScheduler;
use crate::InventoryStateProbe;
use crate::ObserverTypeConfig;
use crate::PartPos;
use crate::PrioritizedPartPos;
use crate::ScheduledTask;
use crate::StorageNetwork;

/// Collaborator bundle built from the in-memory fixtures below, for tests
/// that drive the full engine through simulated world state.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct FixtureTypeConfig;

impl ObserverTypeConfig for FixtureTypeConfig {
    type I = TestIngredient;

    type N = MemoryNetwork;

    type SP = MemoryProbe;

    type C = InlineScheduler;
}

/// In-memory [`StorageNetwork`]: a mutable channel/position registry plus
/// per-position contents, with a counter of raw reads so tests can assert a
/// position's diff was (or was not) taken.
pub struct MemoryNetwork {
    channels: Mutex<BTreeMap<ChannelId, Vec<PrioritizedPartPos>>>,
    contents: Mutex<HashMap<PartPos, Vec<TestIngredient>>>,
    duration_index: Arc<DurationIndex>,
    raw_reads: AtomicUsize,
}

impl MemoryNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            channels: Mutex::new(BTreeMap::new()),
            contents: Mutex::new(HashMap::new()),
            duration_index: Arc::new(DurationIndex::new()),
            raw_reads: AtomicUsize::new(0),
        })
    }

    pub fn add_position(
        &self,
        channel: ChannelId,
        pos: PrioritizedPartPos,
    ) {
        self.channels.lock().entry(channel).or_default().push(pos);
    }

    /// Detaches the position from the live structure; the engine only learns
    /// about it through `on_position_removed`.
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
        instances: Vec<TestIngredient>,
    ) {
        self.contents.lock().insert(pos, instances);
    }

    /// How many times the engine read raw instances (i.e. ran a full diff).
    pub fn raw_reads(&self) -> usize {
        self.raw_reads.load(Ordering::SeqCst)
    }
}

impl StorageNetwork<FixtureTypeConfig> for MemoryNetwork {
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
    ) -> Vec<TestIngredient> {
        self.raw_reads.fetch_add(1, Ordering::SeqCst);
        self.contents.lock().get(&pos).cloned().unwrap_or_default()
    }

    fn duration_index(&self) -> Arc<DurationIndex> {
        self.duration_index.clone()
    }
}

/// In-memory [`InventoryStateProbe`]: positions without an entry report no
/// capability.
pub struct MemoryProbe {
    hashes: Mutex<HashMap<PartPos, u64>>,
}

impl MemoryProbe {
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

    pub fn clear_hash(
        &self,
        pos: PartPos,
    ) {
        self.hashes.lock().remove(&pos);
    }
}

impl InventoryStateProbe for MemoryProbe {
    fn state_hash(
        &self,
        pos: PartPos,
    ) -> Option<u64> {
        self.hashes.lock().get(&pos).copied()
    }
}

/// [`ContextScheduler`] that runs every task on the spot, so single-threaded
/// tests observe deliveries synchronously.
pub struct InlineScheduler;

impl InlineScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl ContextScheduler for InlineScheduler {
    fn schedule(
        &self,
        task: ScheduledTask,
    ) {
        task();
    }
}
