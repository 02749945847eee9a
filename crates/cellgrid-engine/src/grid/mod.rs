//! Grid configuration and the instance-to-cell mapping.
//!
//! The vertex stage places instance `i` in column `floor(i / W)` and row
//! `i mod H`. The functions in `cell` reproduce that arithmetic on the CPU so the
//! mapping can be checked without a device.

mod cell;
mod config;

pub use cell::{cell_of, clip_position, CellCoord};
pub use config::GridConfig;
