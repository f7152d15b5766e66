//! This module is the storage-network abstraction layer the observation
//! engine scans.
//!
//! The engine never walks world state itself. Everything it knows about
//! channels, observable positions and their current contents comes through
//! the [`StorageNetwork`] trait, and the optional cheap change-detection
//! capability of a position comes through [`InventoryStateProbe`]. Both are
//! implemented by the embedding application.

mod position;


pub use position::*;

// Trait definition of the current module
// -----------------------------------------------------------------------------
// Core model of the engine: what can be observed, and how cheaply
//

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::alias::IOF;
use crate::diagnostics::DurationIndex;
use crate::ObserverTypeConfig;

/// Identifier of an independent observation channel.
///
/// Channels partition the position space; the engine keeps no state across
/// channels and gives no ordering guarantee between them.
pub type ChannelId = i32;

#[cfg_attr(test, automock)]
pub trait StorageNetwork<T>: Send + Sync + 'static
where T: ObserverTypeConfig
{
    /// All channels that currently have observable positions.
    ///
    /// Called once per engine tick. Channels absent from the result are
    /// simply not scanned this tick; their retained diff state stays put.
    fn channels(&self) -> Vec<ChannelId>;

    /// Snapshot of the observable positions of one channel.
    ///
    /// # Behavior
    /// - The result is an owned copy: the live structure may gain or lose
    ///   positions while a pass is still iterating the snapshot.
    /// - Order is not significant; the engine re-sorts by priority.
    /// - Duplicate positions (same coordinate and side) are allowed and
    ///   collapse onto the same engine state.
    fn prioritized_positions(
        &self,
        channel: ChannelId,
    ) -> Vec<PrioritizedPartPos>;

    /// Current raw ingredient instances stored at one position.
    ///
    /// Returns an empty vec for a position that exists but holds nothing.
    /// The engine collapses duplicates and zero quantities itself.
    fn raw_instances(
        &self,
        pos: PartPos,
    ) -> Vec<IOF<T>>;

    /// Per-target observation timing index, filled by the engine while a
    /// diagnostics session is open and cleared by it when none is.
    fn duration_index(&self) -> Arc<DurationIndex>;
}

#[cfg_attr(test, automock)]
pub trait InventoryStateProbe: Send + Sync + 'static {
    /// Cheap change-detection hash of the inventory behind a position.
    ///
    /// `None` means the position exposes no such capability; the engine then
    /// always runs the full diff. An unchanged hash lets the engine skip the
    /// position entirely for the current pass.
    fn state_hash(
        &self,
        pos: PartPos,
    ) -> Option<u64>;
}
