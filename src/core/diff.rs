use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

/// An observable item instance flowing through the engine.
///
/// Identity for diffing is the prototype [`key`](IngredientInstance::key):
/// instances with equal keys are the same item and their quantities merge.
/// `with_quantity` stamps a new quantity onto a prototype so diffs can report
/// exact deltas.
pub trait IngredientInstance: Clone + Debug + Send + Sync + 'static {
    type Key: Clone + Debug + Eq + Hash + Ord + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    fn quantity(&self) -> u64;

    fn with_quantity(
        &self,
        quantity: u64,
    ) -> Self;
}

/// An unordered item collection collapsed to one entry per prototype key.
///
/// Each entry keeps the first instance seen for the key as representative
/// plus the merged quantity. Zero-quantity entries are never stored, so
/// emptiness checks stay O(1) honest. Key-ordered storage makes every
/// iteration (and therefore every emitted diff) deterministic.
pub struct CollapsedCollection<I>
where I: IngredientInstance
{
    entries: BTreeMap<I::Key, (I, u64)>,
}

impl<I> CollapsedCollection<I>
where I: IngredientInstance
{
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn collect(instances: impl IntoIterator<Item = I>) -> Self {
        let mut collection = Self::new();
        for instance in instances {
            collection.insert(instance);
        }
        collection
    }

    /// Merge one instance in. Zero quantities are dropped on the floor.
    pub fn insert(
        &mut self,
        instance: I,
    ) {
        let quantity = instance.quantity();
        if quantity == 0 {
            return;
        }
        self.entries
            .entry(instance.key())
            .and_modify(|(_, total)| *total += quantity)
            .or_insert((instance, quantity));
    }

    /// Subtract quantity under a key, removing the entry when it hits zero.
    /// Subtracting below zero saturates; the entry is removed.
    pub fn remove(
        &mut self,
        key: &I::Key,
        quantity: u64,
    ) {
        if let Some((_, total)) = self.entries.get_mut(key) {
            if *total > quantity {
                *total -= quantity;
            } else {
                self.entries.remove(key);
            }
        }
    }

    pub fn quantity(
        &self,
        key: &I::Key,
    ) -> u64 {
        self.entries.get(key).map(|(_, total)| *total).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Key-ordered instances, each carrying its merged quantity.
    pub fn instances(&self) -> Vec<I> {
        self.entries
            .values()
            .map(|(representative, total)| representative.with_quantity(*total))
            .collect()
    }

    fn iter(&self) -> impl Iterator<Item = (&I::Key, &I, u64)> {
        self.entries
            .iter()
            .map(|(key, (representative, total))| (key, representative, *total))
    }
}

impl<I> Default for CollapsedCollection<I>
where I: IngredientInstance
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Debug for CollapsedCollection<I>
where I: IngredientInstance
{
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, (_, total))| (key, total)))
            .finish()
    }
}

/// Collapsed equality: same keys with same merged quantities.
impl<I> PartialEq for CollapsedCollection<I>
where I: IngredientInstance
{
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .iter()
                .all(|(key, _, total)| other.quantity(key) == total)
    }
}

impl<I> Eq for CollapsedCollection<I> where I: IngredientInstance {}

/// Exact per-key delta between two consecutive snapshots of one position.
#[derive(Debug, Clone)]
pub struct IngredientDiff<I>
where I: IngredientInstance
{
    additions: Vec<I>,
    deletions: Vec<I>,
    completely_empty: bool,
}

impl<I> IngredientDiff<I>
where I: IngredientInstance
{
    pub fn has_additions(&self) -> bool {
        !self.additions.is_empty()
    }

    pub fn has_deletions(&self) -> bool {
        !self.deletions.is_empty()
    }

    pub fn has_changes(&self) -> bool {
        self.has_additions() || self.has_deletions()
    }

    pub fn additions(&self) -> &[I] {
        &self.additions
    }

    pub fn deletions(&self) -> &[I] {
        &self.deletions
    }

    /// True when the snapshot this diff led to holds nothing at all.
    pub fn is_completely_empty(&self) -> bool {
        self.completely_empty
    }
}

/// Retains the last collapsed snapshot of one position and turns each fresh
/// observation into an [`IngredientDiff`] against it.
///
/// The very first observation reports the entire contents as additions. The
/// manager is pure apart from the retained snapshot: identical inputs from
/// identical state produce identical diffs.
pub struct IngredientDiffManager<I>
where I: IngredientInstance
{
    last: CollapsedCollection<I>,
}

impl<I> IngredientDiffManager<I>
where I: IngredientInstance
{
    pub fn new() -> Self {
        Self {
            last: CollapsedCollection::new(),
        }
    }

    pub fn on_change(
        &mut self,
        instances: impl IntoIterator<Item = I>,
    ) -> IngredientDiff<I> {
        let current = CollapsedCollection::collect(instances);

        let mut additions = Vec::new();
        for (key, representative, total) in current.iter() {
            let previous = self.last.quantity(key);
            if total > previous {
                additions.push(representative.with_quantity(total - previous));
            }
        }

        let mut deletions = Vec::new();
        for (key, representative, total) in self.last.iter() {
            let remaining = current.quantity(key);
            if total > remaining {
                deletions.push(representative.with_quantity(total - remaining));
            }
        }

        let completely_empty = current.is_empty();
        self.last = current;

        IngredientDiff {
            additions,
            deletions,
            completely_empty,
        }
    }

    pub fn last_snapshot(&self) -> &CollapsedCollection<I> {
        &self.last
    }
}

impl<I> Default for IngredientDiffManager<I>
where I: IngredientInstance
{
    fn default() -> Self {
        Self::new()
    }
}
