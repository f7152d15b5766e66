use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::warn;

use crate::Result;
use crate::SystemError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Owned fixed-size pool for the optional multithreaded observation path.
///
/// Each worker drains its own unbounded queue; `execute` round-robins jobs
/// across the queues and never blocks, never sheds. Queue growth is bounded
/// only by how far submission outpaces the workers, which is an accepted
/// property of the pooled path. The pool belongs to one engine and stops
/// with it, so two engines never share worker state.
pub struct WorkerPool {
    job_txs: Vec<mpsc::UnboundedSender<Job>>,
    next_worker: AtomicUsize,
    shutdown_tx: watch::Sender<()>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawns `worker_threads` (>= 1) workers. Must be called inside a tokio
    /// runtime.
    pub fn new(worker_threads: usize) -> Self {
        debug_assert!(worker_threads >= 1);

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let mut job_txs = Vec::with_capacity(worker_threads);
        let mut handles = Vec::with_capacity(worker_threads);

        for worker_id in 0..worker_threads {
            let (job_tx, job_rx) = mpsc::unbounded_channel();
            handles.push(tokio::spawn(Self::worker_loop(worker_id, job_rx, shutdown_rx.clone())));
            job_txs.push(job_tx);
        }

        Self {
            job_txs,
            next_worker: AtomicUsize::new(0),
            shutdown_tx,
            handles: Mutex::new(handles),
        }
    }

    async fn worker_loop(
        worker_id: usize,
        mut job_rx: mpsc::UnboundedReceiver<Job>,
        mut shutdown_signal: watch::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                // P0: shutdown received; queued jobs are abandoned, the
                // inline pass already covers their work
                _ = shutdown_signal.changed() => {
                    warn!("[WorkerPool] worker {} shutdown signal received.", worker_id);
                    return;
                }

                Some(job) = job_rx.recv() => {
                    job();
                }
            }
        }
    }

    /// Fire-and-forget submission. After shutdown the job is dropped with a
    /// warning.
    pub fn execute<F>(
        &self,
        job: F,
    ) where
        F: FnOnce() + Send + 'static,
    {
        let index = self.next_worker.fetch_add(1, Ordering::Relaxed) % self.job_txs.len();
        if self.job_txs[index].send(Box::new(job)).is_err() {
            warn!("[WorkerPool] worker {} is stopped; dropping a job", index);
        }
    }

    /// Signals all workers and waits for them to stop.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .map_err(|e| SystemError::ShutdownSignal(e.to_string()))?;

        let handles = std::mem::take(&mut *self.handles.lock());
        for result in join_all(handles).await {
            result?;
        }
        debug!("[WorkerPool] stopped.");
        Ok(())
    }
}
