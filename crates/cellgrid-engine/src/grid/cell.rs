use super::GridConfig;

/// Column/row of a cell, zero-based from the bottom-left.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CellCoord {
    pub col: u32,
    pub row: u32,
}

/// Cell addressed by `instance`, matching the vertex stage.
///
/// Column advances every `height` instances; row cycles within `[0, height)`.
/// The column divisor is the grid width, as in the shader.
pub fn cell_of(instance: u32, grid: &GridConfig) -> CellCoord {
    let i = instance as f32;
    let [w, h] = grid.uniform();
    CellCoord {
        col: (i / w).floor() as u32,
        row: (i % h) as u32,
    }
}

/// Clip-space position of local vertex `pos` for `instance`.
///
/// `gridPos = (pos + 1) / grid - 1 + cell / grid * 2`
pub fn clip_position(pos: [f32; 2], instance: u32, grid: &GridConfig) -> [f32; 2] {
    let cell = cell_of(instance, grid);
    let [w, h] = grid.uniform();
    let offset = [cell.col as f32 / w * 2.0, cell.row as f32 / h * 2.0];
    [
        (pos[0] + 1.0) / w - 1.0 + offset[0],
        (pos[1] + 1.0) / h - 1.0 + offset[1],
    ]
}
