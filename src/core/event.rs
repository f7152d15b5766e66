use crate::ChannelId;
use crate::IngredientInstance;
use crate::PartPos;

/// Direction of a detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Addition,
    Deletion,
}

/// One detected change at one position, delivered to every listener.
///
/// A single observation pass emits at most one `Addition` and one `Deletion`
/// event per position; `instances` carries the exact per-key deltas. Events
/// of different channels may arrive in any order relative to each other.
#[derive(Debug, Clone)]
pub struct StorageChangeEvent<I>
where I: IngredientInstance
{
    pub channel: ChannelId,
    pub pos: PartPos,
    pub change: Change,
    /// Only ever true on a `Deletion` that left the position holding
    /// nothing at all.
    pub complete: bool,
    pub instances: Vec<I>,
}

impl<I> StorageChangeEvent<I>
where I: IngredientInstance
{
    pub(crate) fn addition(
        channel: ChannelId,
        pos: PartPos,
        instances: Vec<I>,
    ) -> Self {
        Self {
            channel,
            pos,
            change: Change::Addition,
            complete: false,
            instances,
        }
    }

    pub(crate) fn deletion(
        channel: ChannelId,
        pos: PartPos,
        complete: bool,
        instances: Vec<I>,
    ) -> Self {
        Self {
            channel,
            pos,
            change: Change::Deletion,
            complete,
            instances,
        }
    }
}
