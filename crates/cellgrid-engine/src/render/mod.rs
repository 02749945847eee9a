//! GPU resources and the single render pass.
//!
//! Build order: vertex + uniform buffers, then the pipeline, then the bind
//! group, then the frame. Each step takes the previous step's output by reference.
//!
//! Convention:
//! - local quad vertices are in [-1, 1], scaled to one cell by the vertex stage
//! - instance index selects the cell, column-major from the bottom-left

mod binding;
mod buffer;
mod frame;
mod pipeline;
mod shader;
mod vertex;

pub use binding::BindingSet;
pub use buffer::{check_write, upload_grid_uniform, upload_vertices, GpuBuffer, GridUniform};
pub use frame::{FrameRenderer, GridDraw, DEFAULT_CLEAR_COLOR};
pub use pipeline::{check_target_format, CellPipeline, PipelineBuilder};
pub use shader::{
    validate_buffer_binding, BindingKind, BindingSlot, ShaderProgram, GRID_UNIFORM_BINDING,
    GRID_UNIFORM_GROUP,
};
pub use vertex::{CellVertex, VertexLayout, CELL_QUAD};
