mod config;
mod constants;
mod core;
mod diagnostics;
mod dispatch;
mod errors;
mod metrics;
mod network;
mod type_config;

pub use core::*;

pub use config::*;
pub use diagnostics::*;
pub use dispatch::*;
pub use errors::*;
pub use metrics::*;
pub use network::*;
pub use type_config::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
