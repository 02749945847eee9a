//! The full setup sequence for one grid on one device.

use crate::device::Gpu;
use crate::error::Result;
use crate::grid::GridConfig;
use crate::render::{
    upload_grid_uniform, upload_vertices, BindingSet, CellPipeline, CellVertex, FrameRenderer,
    GpuBuffer, GridDraw, PipelineBuilder, ShaderProgram, CELL_QUAD,
};

/// GPU resources for an instanced cell grid.
///
/// Built in order (geometry, uniform, pipeline, bindings); the first failing
/// step aborts construction.
#[derive(Debug)]
pub struct CellGrid {
    config: GridConfig,
    vertex_buffer: GpuBuffer,
    uniform_buffer: GpuBuffer,
    pipeline: CellPipeline,
    bindings: BindingSet,
    vertex_count: u32,
}

impl CellGrid {
    /// Builds the grid against the surface format of `gpu`.
    pub fn new(gpu: &Gpu<'_>, config: GridConfig) -> Result<Self> {
        Self::with_target(gpu.device(), gpu.queue(), gpu.surface_format(), config)
    }

    /// Builds the grid for any color target of `format`.
    pub fn with_target(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        config: GridConfig,
    ) -> Result<Self> {
        log::info!("building {}x{} cell grid", config.width(), config.height());

        let vertex_buffer =
            upload_vertices(device, queue, "cellgrid cell vertices", &CELL_QUAD, &CellVertex::LAYOUT)?;
        let uniform_buffer = upload_grid_uniform(device, queue, &config)?;

        let program = ShaderProgram::cell();
        let pipeline = PipelineBuilder::new(&program, CellVertex::LAYOUT).build(device, format, format)?;

        let bindings = BindingSet::build(device, &pipeline, &uniform_buffer)?;

        Ok(Self {
            config,
            vertex_buffer,
            uniform_buffer,
            pipeline,
            bindings,
            vertex_count: CELL_QUAD.len() as u32,
        })
    }

    pub fn config(&self) -> GridConfig {
        self.config
    }

    pub fn uniform_buffer(&self) -> &GpuBuffer {
        &self.uniform_buffer
    }

    /// Draw parameters; the instance count comes from the same config as the uniform.
    pub fn draw(&self) -> GridDraw<'_> {
        GridDraw {
            pipeline: &self.pipeline,
            vertex_buffer: &self.vertex_buffer,
            bindings: &self.bindings,
            vertex_count: self.vertex_count,
            instance_count: self.config.instance_count(),
        }
    }

    /// Renders and submits one frame to the surface of `gpu`.
    pub fn render(&self, gpu: &Gpu<'_>, renderer: &FrameRenderer) -> Result<()> {
        renderer.render_frame(gpu, &self.draw())?;
        Ok(())
    }
}
