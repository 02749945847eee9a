//! GPU device + surface acquisition.
//!
//! This module is responsible for:
//! - checking that the host exposes a GPU backend
//! - requesting the adapter and the logical device/queue
//! - creating and configuring the surface with its preferred format
//! - acquiring the frame texture and submitting recorded work

mod context;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use frame::GpuFrame;
pub use init::GpuInit;
