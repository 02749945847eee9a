//! Device buffers with a fixed, checked size.

use bytemuck::{Pod, Zeroable};

use crate::error::{GridError, Result};
use crate::grid::GridConfig;

use super::vertex::VertexLayout;

/// A device buffer that remembers its declared size and usage.
///
/// The size is fixed at creation; every write is checked against it.
#[derive(Debug)]
pub struct GpuBuffer {
    label: String,
    buffer: wgpu::Buffer,
    size: u64,
    usage: wgpu::BufferUsages,
}

impl GpuBuffer {
    /// Creates an uninitialized buffer of `size` bytes.
    pub fn new(device: &wgpu::Device, label: &str, size: u64, usage: wgpu::BufferUsages) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        });

        Self {
            label: label.to_owned(),
            buffer,
            size,
            usage,
        }
    }

    /// Creates a buffer sized exactly to `bytes` and writes them in one transfer.
    ///
    /// `usage` must include `COPY_DST`.
    pub fn with_contents(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        usage: wgpu::BufferUsages,
        bytes: &[u8],
    ) -> Result<Self> {
        // Validate before allocating so a bad payload never reaches the device.
        check_write(label, bytes.len() as u64, 0, bytes.len() as u64)?;

        let buf = Self::new(device, label, bytes.len() as u64, usage);
        buf.write(queue, 0, bytes)?;
        Ok(buf)
    }

    /// Queues a write of `bytes` at `offset`.
    pub fn write(&self, queue: &wgpu::Queue, offset: u64, bytes: &[u8]) -> Result<()> {
        check_write(&self.label, self.size, offset, bytes.len() as u64)?;
        queue.write_buffer(&self.buffer, offset, bytes);
        Ok(())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn usage(&self) -> wgpu::BufferUsages {
        self.usage
    }

    pub fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Checks that `len` bytes at `offset` fit in a buffer of `size` bytes and
/// respect the copy alignment.
pub fn check_write(label: &str, size: u64, offset: u64, len: u64) -> Result<()> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| GridError::size_mismatch(label, size, u64::MAX))?;

    if end > size {
        return Err(GridError::size_mismatch(label, size, end));
    }

    if offset % wgpu::COPY_BUFFER_ALIGNMENT != 0 || len % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
        let aligned = len.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        return Err(GridError::size_mismatch(
            format!("{label} (offset {offset}, 4-byte aligned copy)"),
            aligned,
            len,
        ));
    }

    Ok(())
}

// ── geometry ──────────────────────────────────────────────────────────────

/// Uploads static vertex data laid out per `layout`.
///
/// The buffer is exactly as large as the vertex data and is flagged for
/// vertex reads plus copy-destination.
pub fn upload_vertices<V: Pod>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    vertices: &[V],
    layout: &VertexLayout,
) -> Result<GpuBuffer> {
    let element = std::mem::size_of::<V>() as u64;
    if element != layout.stride() {
        return Err(GridError::size_mismatch(
            format!("{label} vertex stride"),
            layout.stride(),
            element,
        ));
    }

    if vertices.is_empty() {
        return Err(GridError::size_mismatch(label, layout.stride(), 0));
    }

    let bytes: &[u8] = bytemuck::cast_slice(vertices);
    log::debug!("{label}: {} vertices, {} bytes", vertices.len(), bytes.len());

    GpuBuffer::with_contents(
        device,
        queue,
        label,
        wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        bytes,
    )
}

// ── grid uniform ──────────────────────────────────────────────────────────

/// Uniform block read by the vertex stage: `vec2f(width, height)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GridUniform {
    pub size: [f32; 2],
}

impl GridUniform {
    pub const SIZE: u64 = std::mem::size_of::<GridUniform>() as u64;

    pub fn from_config(grid: &GridConfig) -> Self {
        Self {
            size: grid.uniform(),
        }
    }
}

/// Uploads the grid dimensions as a uniform + copy-destination buffer.
pub fn upload_grid_uniform(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    grid: &GridConfig,
) -> Result<GpuBuffer> {
    let uniform = GridUniform::from_config(grid);
    log::debug!("grid uniform: {:?}", uniform.size);

    GpuBuffer::with_contents(
        device,
        queue,
        "cellgrid grid uniform",
        wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        bytemuck::bytes_of(&uniform),
    )
}
