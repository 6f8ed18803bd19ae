//! Concrete structural observer implementations
//!
//! Each variant is a separate module for clarity.

pub mod native;
pub mod polling;

// Re-export for convenience
pub use native::NativeObserver;
pub use polling::PollingObserver;
