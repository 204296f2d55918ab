/// Device module - the core's model of the underlying graphics API

// Module declarations
pub mod types;
pub mod context;

#[cfg(test)]
pub mod mock_device;

// Re-exports
pub use types::*;
pub use context::*;
