//! Host window + event loop.
//!
//! Owns the `winit` EventLoop and Window, acquires the GPU for that window and
//! renders the grid exactly once.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
