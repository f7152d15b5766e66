// -
// Adaptive observation frequency defaults (in ticks)

/// Fastest allowed re-check interval for a volatile position
pub(crate) const DEFAULT_FREQUENCY_MIN: u64 = 5;
/// Slowest allowed re-check interval for a quiet position
pub(crate) const DEFAULT_FREQUENCY_MAX: u64 = 40;

/// Interval shrink applied after a check that found changes
pub(crate) const DEFAULT_FREQUENCY_DECREASE_FACTOR: u64 = 10;
/// Interval growth applied after a check that found nothing
pub(crate) const DEFAULT_FREQUENCY_INCREASE_FACTOR: u64 = 1;

// -
// Dispatch defaults

pub(crate) const DEFAULT_WORKER_THREADS: usize = 4;
pub(crate) const DEFAULT_ENABLE_MULTITHREADING: bool = false;
