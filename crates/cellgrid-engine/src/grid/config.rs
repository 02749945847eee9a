use crate::error::{GridError, Result};

/// Grid dimensions shared by the uniform payload and the draw call.
///
/// Instance count and uniform values are both derived from this value, so the
/// two cannot disagree.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GridConfig {
    width: u32,
    height: u32,
}

impl GridConfig {
    pub const DEFAULT_SIZE: u32 = 16;

    /// Creates a grid of `width` columns by `height` rows.
    ///
    /// The cell count must fit in a `u32`, the type of the draw's instance range.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width.checked_mul(height).is_none() {
            return Err(GridError::InvalidGridSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Square grid of `size` x `size` cells.
    pub fn square(size: u32) -> Result<Self> {
        Self::new(size, size)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells, i.e. instances per draw.
    #[inline]
    pub fn cell_count(&self) -> u32 {
        self.width * self.height
    }

    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.cell_count()
    }

    /// Uniform payload as read by the shader: `[width, height]`.
    #[inline]
    pub fn uniform(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_SIZE,
            height: Self::DEFAULT_SIZE,
        }
    }
}
