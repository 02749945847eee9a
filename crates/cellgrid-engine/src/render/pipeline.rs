use crate::error::{GridError, Result};

use super::shader::{BindingSlot, ShaderProgram};
use super::vertex::VertexLayout;

/// Compiled render pipeline plus the bind-group layouts it was built with.
#[derive(Debug)]
pub struct CellPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    bindings: &'static [BindingSlot],
    target_format: wgpu::TextureFormat,
}

impl CellPipeline {
    pub fn raw(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Layout of bind group `group`, if the program declares it.
    pub fn bind_group_layout(&self, group: u32) -> Option<&wgpu::BindGroupLayout> {
        self.bind_group_layouts.get(group as usize)
    }

    /// Binding table the layouts were derived from.
    pub fn bindings(&self) -> &'static [BindingSlot] {
        self.bindings
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }
}

/// Assembles a [`CellPipeline`] from a shader program and a vertex layout.
pub struct PipelineBuilder<'a> {
    program: &'a ShaderProgram,
    vertex_layout: VertexLayout,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(program: &'a ShaderProgram, vertex_layout: VertexLayout) -> Self {
        Self {
            program,
            vertex_layout,
        }
    }

    /// Compiles the program and builds the pipeline for a single color target.
    ///
    /// `output_format` must equal `surface_format`; the check runs before any
    /// device work.
    pub fn build(
        &self,
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        surface_format: wgpu::TextureFormat,
    ) -> Result<CellPipeline> {
        check_target_format(output_format, surface_format)?;

        let program = self.program;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.label),
            source: wgpu::ShaderSource::Wgsl(program.source.clone()),
        });

        let bind_group_layouts: Vec<wgpu::BindGroupLayout> = (0..program.group_count())
            .map(|group| {
                let entries: Vec<wgpu::BindGroupLayoutEntry> = program
                    .slots_in(group)
                    .map(BindingSlot::layout_entry)
                    .collect();

                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("cellgrid bgl"),
                    entries: &entries,
                })
            })
            .collect();

        let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cellgrid pipeline layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cellgrid cell pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(program.vertex_entry),
                compilation_options: Default::default(),
                buffers: &[self.vertex_layout.to_wgpu()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(program.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: output_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::info!(
            "built {} pipeline targeting {output_format:?} with {} bind group(s)",
            program.label,
            bind_group_layouts.len()
        );

        Ok(CellPipeline {
            pipeline,
            bind_group_layouts,
            bindings: program.bindings,
            target_format: output_format,
        })
    }
}

/// Fails unless the fragment output format equals the surface format.
pub fn check_target_format(
    output: wgpu::TextureFormat,
    surface: wgpu::TextureFormat,
) -> Result<()> {
    if output != surface {
        return Err(GridError::PipelineFormatMismatch { output, surface });
    }
    Ok(())
}
