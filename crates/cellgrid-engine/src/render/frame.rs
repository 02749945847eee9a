use crate::device::Gpu;
use crate::error::Result;

use super::binding::BindingSet;
use super::buffer::GpuBuffer;
use super::pipeline::CellPipeline;

/// Background behind the cells.
pub const DEFAULT_CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.5,
    b: 0.7,
    a: 1.0,
};

/// Everything one instanced draw needs.
pub struct GridDraw<'a> {
    pub pipeline: &'a CellPipeline,
    pub vertex_buffer: &'a GpuBuffer,
    pub bindings: &'a BindingSet,
    pub vertex_count: u32,
    pub instance_count: u32,
}

/// Records and submits the single clear + draw pass.
#[derive(Debug, Copy, Clone)]
pub struct FrameRenderer {
    clear_color: wgpu::Color,
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_COLOR)
    }
}

impl FrameRenderer {
    pub fn new(clear_color: wgpu::Color) -> Self {
        Self { clear_color }
    }

    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    /// Renders one frame to the surface and submits it.
    ///
    /// Returns once the command buffer is queued; GPU completion is not awaited.
    pub fn render_frame(&self, gpu: &Gpu<'_>, draw: &GridDraw<'_>) -> Result<wgpu::SubmissionIndex> {
        let mut frame = gpu.begin_frame()?;

        self.encode(&mut frame.encoder, &frame.view, draw);

        let index = gpu.submit(frame);
        log::debug!(
            "submitted frame: {} vertices x {} instances",
            draw.vertex_count,
            draw.instance_count
        );
        Ok(index)
    }

    /// Records the pass into `encoder`, drawing onto `view`. Nothing is submitted.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        draw: &GridDraw<'_>,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cellgrid pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(draw.pipeline.raw());
        rpass.set_vertex_buffer(0, draw.vertex_buffer.raw().slice(..));
        rpass.set_bind_group(draw.bindings.group(), draw.bindings.raw(), &[]);
        rpass.draw(0..draw.vertex_count, 0..draw.instance_count);
    }
}
