//! Shader programs and the binding table they declare.
//!
//! A program carries its resource bindings as data. Pipeline layouts are built
//! from that table and bind groups are validated against it, so the WGSL
//! declarations and the binding code are kept in one place.

use std::borrow::Cow;

use crate::error::{GridError, Result};

use super::buffer::GridUniform;

/// Resource kind expected at a binding slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BindingKind {
    UniformBuffer { min_size: u64 },
    Sampler,
}

impl BindingKind {
    fn to_wgpu(self) -> wgpu::BindingType {
        match self {
            BindingKind::UniformBuffer { min_size } => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(min_size),
            },
            BindingKind::Sampler => {
                wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
            }
        }
    }
}

/// One `@group(g) @binding(b)` declaration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BindingSlot {
    pub group: u32,
    pub binding: u32,
    pub visibility: wgpu::ShaderStages,
    pub kind: BindingKind,
}

impl BindingSlot {
    pub(crate) fn layout_entry(&self) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: self.binding,
            visibility: self.visibility,
            ty: self.kind.to_wgpu(),
            count: None,
        }
    }
}

/// Group/binding of the grid uniform in `cell.wgsl`.
pub const GRID_UNIFORM_GROUP: u32 = 0;
pub const GRID_UNIFORM_BINDING: u32 = 0;

const CELL_BINDINGS: [BindingSlot; 1] = [BindingSlot {
    group: GRID_UNIFORM_GROUP,
    binding: GRID_UNIFORM_BINDING,
    visibility: wgpu::ShaderStages::VERTEX,
    kind: BindingKind::UniformBuffer {
        min_size: GridUniform::SIZE,
    },
}];

/// WGSL source plus entry points and declared bindings. Immutable once built.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub label: &'static str,
    pub source: Cow<'static, str>,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
    pub bindings: &'static [BindingSlot],
}

impl ShaderProgram {
    /// The instanced cell program.
    pub fn cell() -> Self {
        Self {
            label: "cellgrid cell shader",
            source: Cow::Borrowed(include_str!("shaders/cell.wgsl")),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
            bindings: &CELL_BINDINGS,
        }
    }

    /// Number of bind groups, i.e. one past the highest declared group.
    pub fn group_count(&self) -> u32 {
        self.bindings.iter().map(|s| s.group + 1).max().unwrap_or(0)
    }

    /// Declared slots of `group`, in declaration order.
    pub fn slots_in(&self, group: u32) -> impl Iterator<Item = &BindingSlot> {
        self.bindings.iter().filter(move |s| s.group == group)
    }

    pub fn slot(&self, group: u32, binding: u32) -> Option<&BindingSlot> {
        self.bindings
            .iter()
            .find(|s| s.group == group && s.binding == binding)
    }
}

/// Checks that a buffer of `size` bytes with `usage` may be bound at
/// `group`/`binding` of `slots`.
pub fn validate_buffer_binding(
    slots: &[BindingSlot],
    group: u32,
    binding: u32,
    usage: wgpu::BufferUsages,
    size: u64,
) -> Result<()> {
    let slot = slots
        .iter()
        .find(|s| s.group == group && s.binding == binding)
        .ok_or_else(|| GridError::binding_mismatch(group, binding, "slot is not declared"))?;

    let min_size = match slot.kind {
        BindingKind::UniformBuffer { min_size } => min_size,
        other => {
            return Err(GridError::binding_mismatch(
                group,
                binding,
                format!("slot declares {other:?}, not a buffer"),
            ));
        }
    };

    let required = wgpu::BufferUsages::UNIFORM;
    if !usage.contains(required) {
        return Err(GridError::binding_mismatch(
            group,
            binding,
            format!("buffer usage {usage:?} lacks {required:?}"),
        ));
    }

    if size < min_size {
        return Err(GridError::binding_mismatch(
            group,
            binding,
            format!("buffer is {size} bytes, slot needs at least {min_size}"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::BufferUsages;

    const UNIFORM: BufferUsages = BufferUsages::UNIFORM.union(BufferUsages::COPY_DST);

    #[test]
    fn cell_program_declares_grid_uniform() {
        let program = ShaderProgram::cell();
        assert_eq!(program.group_count(), 1);

        let slot = program.slot(0, 0).expect("grid uniform slot");
        assert_eq!(slot.kind, BindingKind::UniformBuffer { min_size: 8 });
        assert!(slot.visibility.contains(wgpu::ShaderStages::VERTEX));
    }

    #[test]
    fn wgsl_agrees_with_binding_table_and_layout() {
        let program = ShaderProgram::cell();
        let src = &program.source;

        assert!(src.contains("@group(0) @binding(0) var<uniform> grid: vec2<f32>;"));
        assert!(src.contains("@location(0) pos: vec2<f32>"));
        assert!(src.contains("@builtin(instance_index)"));
        assert!(src.contains(&format!("fn {}(", program.vertex_entry)));
        assert!(src.contains(&format!("fn {}(", program.fragment_entry)));
        assert!(src.contains("@location(0) vec4<f32>"));
    }

    #[test]
    fn uniform_accepted_at_declared_slot() {
        let program = ShaderProgram::cell();
        assert!(validate_buffer_binding(program.bindings, 0, 0, UNIFORM, 8).is_ok());
    }

    #[test]
    fn undeclared_slot_rejected() {
        let program = ShaderProgram::cell();
        let err = validate_buffer_binding(program.bindings, 0, 1, UNIFORM, 8).unwrap_err();
        assert!(matches!(err, GridError::BindingMismatch { group: 0, binding: 1, .. }));
    }

    #[test]
    fn non_buffer_slot_rejected() {
        let slots = [BindingSlot {
            group: 0,
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            kind: BindingKind::Sampler,
        }];
        let err = validate_buffer_binding(&slots, 0, 0, UNIFORM, 8).unwrap_err();
        assert_eq!(err.kind(), "BindingMismatchError");
    }

    #[test]
    fn wrong_usage_rejected() {
        let program = ShaderProgram::cell();
        let vertex = BufferUsages::VERTEX | BufferUsages::COPY_DST;
        assert!(validate_buffer_binding(program.bindings, 0, 0, vertex, 8).is_err());
    }

    #[test]
    fn undersized_buffer_rejected() {
        let program = ShaderProgram::cell();
        assert!(validate_buffer_binding(program.bindings, 0, 0, UNIFORM, 4).is_err());
    }
}
