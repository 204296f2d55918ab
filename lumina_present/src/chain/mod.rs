/// Chain module - presentable-image chain and its per-image state

// Module declarations
pub mod selection;
pub mod image_sync;
pub mod present_chain;

// Re-exports
pub use selection::*;
pub use image_sync::*;
pub use present_chain::*;
