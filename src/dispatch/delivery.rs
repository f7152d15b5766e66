use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::warn;

#[cfg(test)]
use mockall::automock;

use crate::Result;
use crate::SystemError;

/// A unit of deferred listener delivery.
pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Hands a closure to the designated execution context.
///
/// With multithreading enabled every event delivery goes through here, so
/// listener code only ever runs where the embedder wants it to. The contract
/// is fire-and-forget: no result, no latency bound, and tasks of one
/// scheduler run one at a time in submission order.
#[cfg_attr(test, automock)]
pub trait ContextScheduler: Send + Sync + 'static {
    fn schedule(
        &self,
        task: ScheduledTask,
    );
}

/// The crate's default [`ContextScheduler`]: one dedicated consumer task
/// draining an unbounded queue.
///
/// Producers only enqueue, so `schedule` never blocks. The single consumer
/// is what makes delivery serial: two listener callbacks are never run
/// concurrently by the same loop. `shutdown` stops the consumer after
/// draining what was already queued; tasks scheduled after that are dropped
/// with a warning.
pub struct DeliveryLoop {
    task_tx: mpsc::UnboundedSender<ScheduledTask>,
    shutdown_tx: watch::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DeliveryLoop {
    /// Spawns the consumer task. Must be called inside a tokio runtime.
    pub fn new() -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let handle = tokio::spawn(Self::run(task_rx, shutdown_rx));

        Self {
            task_tx,
            shutdown_tx,
            handle: Mutex::new(Some(handle)),
        }
    }

    async fn run(
        mut task_rx: mpsc::UnboundedReceiver<ScheduledTask>,
        mut shutdown_signal: watch::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                // P0: shutdown received; run what was queued before it, then stop
                _ = shutdown_signal.changed() => {
                    warn!("[DeliveryLoop] shutdown signal received.");
                    task_rx.close();
                    while let Ok(task) = task_rx.try_recv() {
                        task();
                    }
                    return;
                }

                Some(task) = task_rx.recv() => {
                    task();
                }
            }
        }
    }

    /// Stops the consumer and waits for it to finish its queue.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .map_err(|e| SystemError::ShutdownSignal(e.to_string()))?;

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            handle.await?;
        }
        debug!("[DeliveryLoop] stopped.");
        Ok(())
    }
}

impl Default for DeliveryLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextScheduler for DeliveryLoop {
    fn schedule(
        &self,
        task: ScheduledTask,
    ) {
        if self.task_tx.send(task).is_err() {
            warn!("[DeliveryLoop] stopped; dropping a scheduled delivery");
        }
    }
}
