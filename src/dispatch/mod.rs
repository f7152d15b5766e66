//! Listener dispatch: who hears about changes, and on which thread.
//!
//! Three pieces: the handle-keyed [`ListenerRegistry`] every event fans out
//! through, the [`ContextScheduler`] seam that funnels deliveries onto the
//! embedder's designated execution context, and the [`WorkerPool`] carrying
//! the optional multithreaded observation path.

mod delivery;
mod listeners;
mod worker_pool;

pub use delivery::*;
pub use listeners::*;
pub use worker_pool::*;
