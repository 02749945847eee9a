use bytemuck::{Pod, Zeroable};

/// Per-vertex input layout: stride plus ordered attributes.
#[derive(Debug, Copy, Clone)]
pub struct VertexLayout {
    stride: u64,
    step_mode: wgpu::VertexStepMode,
    attributes: &'static [wgpu::VertexAttribute],
}

impl VertexLayout {
    pub const fn new(
        stride: u64,
        step_mode: wgpu::VertexStepMode,
        attributes: &'static [wgpu::VertexAttribute],
    ) -> Self {
        Self {
            stride,
            step_mode,
            attributes,
        }
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn attributes(&self) -> &'static [wgpu::VertexAttribute] {
        self.attributes
    }

    pub fn to_wgpu(&self) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: self.step_mode,
            attributes: self.attributes,
        }
    }
}

// ── cell quad ─────────────────────────────────────────────────────────────

/// Local-space quad vertex, consumed at `@location(0)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CellVertex {
    pub pos: [f32; 2],
}

impl CellVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub const LAYOUT: VertexLayout = VertexLayout::new(
        std::mem::size_of::<CellVertex>() as u64,
        wgpu::VertexStepMode::Vertex,
        &Self::ATTRS,
    );
}

const fn v(x: f32, y: f32) -> CellVertex {
    CellVertex { pos: [x, y] }
}

/// Two triangles spanning [-0.8, 0.8], leaving a margin inside each cell.
pub const CELL_QUAD: [CellVertex; 6] = [
    v(-0.8, -0.8),
    v(0.8, -0.8),
    v(0.8, 0.8),
    v(-0.8, -0.8),
    v(0.8, 0.8),
    v(-0.8, 0.8),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_one_float2_at_location_zero() {
        let layout = CellVertex::LAYOUT;
        assert_eq!(layout.stride(), 8);

        let [attr] = layout.attributes() else {
            panic!("expected exactly one attribute");
        };
        assert_eq!(attr.format, wgpu::VertexFormat::Float32x2);
        assert_eq!(attr.offset, 0);
        assert_eq!(attr.shader_location, 0);
    }

    #[test]
    fn quad_bytes_are_tightly_packed() {
        let bytes: &[u8] = bytemuck::cast_slice(&CELL_QUAD);
        assert_eq!(bytes.len(), 4 * 2 * CELL_QUAD.len());

        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(&floats[..4], &[-0.8, -0.8, 0.8, -0.8]);
    }
}
