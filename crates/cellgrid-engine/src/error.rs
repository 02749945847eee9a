//! Error taxonomy for the grid setup sequence.
//!
//! Every variant is terminal for the current session: the setup sequence stops
//! at the first failure and the error is handed back to the caller unchanged.

use thiserror::Error;

/// Failure raised by any stage of device acquisition, resource creation, or
/// frame submission.
#[derive(Error, Debug)]
pub enum GridError {
    /// The host exposes no GPU capability (no compiled backend, or the drawing
    /// target cannot host a GPU surface).
    #[error("GPU capability unavailable: {0}")]
    UnsupportedPlatform(String),

    /// No hardware adapter satisfied the request.
    #[error("no suitable GPU adapter: {0}")]
    AdapterUnavailable(#[from] wgpu::RequestAdapterError),

    /// The adapter rejected the logical device request.
    #[error("device request rejected: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Data byte length disagrees with a declared buffer or layout size.
    #[error("{label}: expected {expected} bytes, got {actual}")]
    ResourceSizeMismatch {
        label: String,
        expected: u64,
        actual: u64,
    },

    /// Fragment output format differs from the configured surface format.
    #[error("pipeline output format {output:?} does not match surface format {surface:?}")]
    PipelineFormatMismatch {
        output: wgpu::TextureFormat,
        surface: wgpu::TextureFormat,
    },

    /// Requested binding slot or resource kind is absent from the declared layout.
    #[error("binding mismatch at group {group}, binding {binding}: {reason}")]
    BindingMismatch {
        group: u32,
        binding: u32,
        reason: String,
    },

    /// A grid dimension was zero, or the cell count overflows `u32`.
    #[error("invalid grid size {width}x{height}: need 1 <= W, H and W * H <= u32::MAX")]
    InvalidGridSize { width: u32, height: u32 },

    /// The surface could not produce a frame texture.
    #[error("failed to acquire surface texture: {0}")]
    SurfaceAcquire(#[from] wgpu::SurfaceError),
}

impl GridError {
    /// Stable label naming the failure kind, suitable for user-facing reports.
    pub fn kind(&self) -> &'static str {
        match self {
            GridError::UnsupportedPlatform(_) => "UnsupportedPlatformError",
            GridError::AdapterUnavailable(_) => "AdapterUnavailableError",
            GridError::DeviceRequest(_) => "DeviceRequestError",
            GridError::ResourceSizeMismatch { .. } => "ResourceSizeMismatchError",
            GridError::PipelineFormatMismatch { .. } => "PipelineFormatMismatchError",
            GridError::BindingMismatch { .. } => "BindingMismatchError",
            GridError::InvalidGridSize { .. } => "InvalidGridSizeError",
            GridError::SurfaceAcquire(_) => "SurfaceAcquireError",
        }
    }

    pub(crate) fn size_mismatch(label: impl Into<String>, expected: u64, actual: u64) -> Self {
        GridError::ResourceSizeMismatch {
            label: label.into(),
            expected,
            actual,
        }
    }

    pub(crate) fn binding_mismatch(group: u32, binding: u32, reason: impl Into<String>) -> Self {
        GridError::BindingMismatch {
            group,
            binding,
            reason: reason.into(),
        }
    }
}

/// Engine-wide result alias.
pub type Result<T> = std::result::Result<T, GridError>;
