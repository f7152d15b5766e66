//! Configuration management module for the observation engine.
//!
//! Provides hierarchical configuration loading from multiple sources with priority:
//! 1. Default values (hardcoded)
//! 2. Explicit config file
//! 3. `CONFIG_PATH` config file
//! 4. Environment variables (highest priority)
//!

mod dispatch;
mod frequency;
pub use dispatch::*;
pub use frequency::*;


//---
use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ObserverConfig {
    /// Adaptive re-check frequency bounds and step sizes
    #[serde(default)]
    pub frequency: FrequencyConfig,

    /// Worker pool sizing and the multithreaded observation switch
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl ObserverConfig {
    /// Load configuration from multiple sources with priority:
    /// 1. Explicit config file (required when given)
    /// 2. `CONFIG_PATH` file
    /// 3. `OBSERVER`-prefixed environment variables
    ///
    /// The merged result is validated before it is returned.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        if let Ok(path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&path).required(false));
        }

        // Environment variables (highest priority)
        builder = builder.add_source(
            Environment::with_prefix("OBSERVER")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: ObserverConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all engine configuration sections
    pub fn validate(&self) -> Result<()> {
        self.frequency.validate()?;
        self.dispatch.validate()?;

        Ok(())
    }
}
