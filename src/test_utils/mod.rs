//! the test_utils folder here will share utils or test components between
//! unit tests and integration tests
mod memory_network;
pub mod mock_type_config;

pub use common::*;
pub use memory_network::*;
pub use mock_type_config::*;
