use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_ENABLE_MULTITHREADING;
use crate::constants::DEFAULT_WORKER_THREADS;
use crate::Error;
use crate::Result;

/// Dispatch settings: the multithreaded observation switch and pool sizing.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DispatchConfig {
    /// With multithreading on, every channel pass is additionally submitted
    /// to the worker pool and event delivery goes through the context
    /// scheduler instead of running on the observing thread.
    #[serde(default = "default_enable_multithreading")]
    pub enable_multithreading: bool,

    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            enable_multithreading: default_enable_multithreading(),
            worker_threads: default_worker_threads(),
        }
    }
}

impl DispatchConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Error::Config(ConfigError::Message(
                "worker_threads must be at least 1".into(),
            )));
        }

        Ok(())
    }
}

fn default_enable_multithreading() -> bool {
    DEFAULT_ENABLE_MULTITHREADING
}
fn default_worker_threads() -> usize {
    DEFAULT_WORKER_THREADS
}
