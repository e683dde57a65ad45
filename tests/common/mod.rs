//! Common test utilities and mock implementations

pub mod mock_link;

pub use mock_link::{MockLink, Operation};
