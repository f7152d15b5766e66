use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_FREQUENCY_DECREASE_FACTOR;
use crate::constants::DEFAULT_FREQUENCY_INCREASE_FACTOR;
use crate::constants::DEFAULT_FREQUENCY_MAX;
use crate::constants::DEFAULT_FREQUENCY_MIN;
use crate::Error;
use crate::Result;

/// Bounds and step sizes of the adaptive re-check interval, in ticks.
///
/// Every position's interval lives in `[frequency_min, frequency_max]`.
/// A check that found changes shrinks it by `frequency_decrease_factor`;
/// a quiet check grows it by `frequency_increase_factor`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FrequencyConfig {
    #[serde(default = "default_frequency_min")]
    pub frequency_min: u64,

    #[serde(default = "default_frequency_max")]
    pub frequency_max: u64,

    #[serde(default = "default_frequency_decrease_factor")]
    pub frequency_decrease_factor: u64,

    #[serde(default = "default_frequency_increase_factor")]
    pub frequency_increase_factor: u64,
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            frequency_min: default_frequency_min(),
            frequency_max: default_frequency_max(),
            frequency_decrease_factor: default_frequency_decrease_factor(),
            frequency_increase_factor: default_frequency_increase_factor(),
        }
    }
}

impl FrequencyConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.frequency_min == 0 {
            return Err(Error::Config(ConfigError::Message(
                "frequency_min must be at least 1 tick".into(),
            )));
        }

        if self.frequency_max < self.frequency_min {
            return Err(Error::Config(ConfigError::Message(
                "frequency_max cannot be smaller than frequency_min".into(),
            )));
        }

        Ok(())
    }
}

fn default_frequency_min() -> u64 {
    DEFAULT_FREQUENCY_MIN
}
fn default_frequency_max() -> u64 {
    DEFAULT_FREQUENCY_MAX
}
fn default_frequency_decrease_factor() -> u64 {
    DEFAULT_FREQUENCY_DECREASE_FACTOR
}
fn default_frequency_increase_factor() -> u64 {
    DEFAULT_FREQUENCY_INCREASE_FACTOR
}
