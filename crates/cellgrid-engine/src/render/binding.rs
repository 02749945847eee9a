use crate::error::{GridError, Result};

use super::buffer::GpuBuffer;
use super::pipeline::CellPipeline;
use super::shader::{validate_buffer_binding, GRID_UNIFORM_BINDING, GRID_UNIFORM_GROUP};

/// A bind group plus the group index it must be set at.
///
/// Holds clones of the device handles; the referenced buffer stays alive for
/// as long as the bind group does.
#[derive(Debug)]
pub struct BindingSet {
    group: u32,
    bind_group: wgpu::BindGroup,
}

impl BindingSet {
    /// Binds `uniform` to the grid uniform slot of `pipeline`.
    pub fn build(
        device: &wgpu::Device,
        pipeline: &CellPipeline,
        uniform: &GpuBuffer,
    ) -> Result<Self> {
        Self::with_buffer(device, pipeline, GRID_UNIFORM_GROUP, GRID_UNIFORM_BINDING, uniform)
    }

    /// Binds a single buffer at `group`/`binding`, validated against the
    /// pipeline's binding table.
    pub fn with_buffer(
        device: &wgpu::Device,
        pipeline: &CellPipeline,
        group: u32,
        binding: u32,
        buffer: &GpuBuffer,
    ) -> Result<Self> {
        validate_buffer_binding(
            pipeline.bindings(),
            group,
            binding,
            buffer.usage(),
            buffer.size(),
        )?;

        let layout = pipeline
            .bind_group_layout(group)
            .ok_or_else(|| GridError::binding_mismatch(group, binding, "group has no layout"))?;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cellgrid bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding,
                resource: buffer.raw().as_entire_binding(),
            }],
        });

        log::debug!("bound {} at group {group}, binding {binding}", buffer.label());

        Ok(Self { group, bind_group })
    }

    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn raw(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
