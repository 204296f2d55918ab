/*!
# Lumina Present

Presentation-surface management for a real-time renderer.

This crate owns the chain of presentable images, the per-image
synchronization primitives, and the acquire/submit/present protocol that
keeps the CPU, GPU, and display pipeline correctly ordered. It is
platform-agnostic: the underlying graphics API is reached through the
[`device::DeviceContext`] trait, and backend implementations (Vulkan, ...)
live in separate crates.

## Architecture

- **DeviceContext**: trait abstracting the surface/device/queue operations
- **PresentChain**: the presentable-image chain and its frame protocol
- **ImageSync**: per-image synchronization record (view, semaphores, fence)

The caller requests the current image, records rendering commands against
it, and hands the commands to [`chain::PresentChain::present`]; it never
touches semaphores or fences directly.
*/

// Internal modules
mod error;
pub mod log;
pub mod device;
pub mod chain;

// Main lumina namespace module
pub mod lumina {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        pub use crate::log::{set_logger, reset_logger};
    }

    // Device abstraction sub-module
    pub mod device {
        pub use crate::device::*;
    }

    // Presentation sub-module
    pub mod present {
        pub use crate::chain::*;
    }
}
