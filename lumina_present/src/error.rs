//! Error types for the presentation core
//!
//! This module defines the error kinds surfaced by chain construction,
//! the steady-state present protocol, and the backend pass-through
//! failures that are propagated without interpretation.

use std::fmt;

/// Result type for presentation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Presentation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The surface reported a zero-area extent. Fatal to the construction
    /// attempt; the caller should wait for a resize event and retry.
    InvalidSurfaceDimensions {
        /// Clamped width that was rejected
        width: u32,
        /// Clamped height that was rejected
        height: u32,
    },

    /// An acquire call reported neither success nor the degraded-but-usable
    /// suboptimal status. Fatal to the current chain instance.
    ImageAcquireFailed,

    /// Presentation reported the chain no longer matches the surface.
    /// The caller is expected to rebuild via `recreate`.
    SwapchainOutOfDate,

    /// Out of GPU memory
    OutOfMemory,

    /// The device was lost
    DeviceLost,

    /// The surface was lost
    SurfaceLost,

    /// Backend-specific error (Vulkan, etc.)
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSurfaceDimensions { width, height } => {
                write!(f, "Invalid surface dimensions: {}x{}", width, height)
            }
            Error::ImageAcquireFailed => write!(f, "Image acquire failed"),
            Error::SwapchainOutOfDate => write!(f, "Swapchain out of date"),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::DeviceLost => write!(f, "Device lost"),
            Error::SurfaceLost => write!(f, "Surface lost"),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an ERROR and build a `BackendError` from the same message
///
/// # Example
///
/// ```ignore
/// .map_err(|e| lumina_err!("lumina::chain", "Submit failed: {:?}", e))?
/// ```
#[macro_export]
macro_rules! lumina_err {
    ($source:expr, $($arg:tt)*) => {{
        $crate::lumina_error!($source, $($arg)*);
        $crate::lumina::Error::BackendError(format!($($arg)*))
    }};
}

/// Log an ERROR and return early with a `BackendError`
#[macro_export]
macro_rules! lumina_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::lumina_err!($source, $($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
