//! Cellgrid engine crate.
//!
//! Acquires a GPU device and surface, uploads a unit quad and the grid
//! dimensions, and draws the grid as one instanced call.

pub mod device;
pub mod error;
pub mod grid;
pub mod logging;
pub mod render;
pub mod session;
pub mod window;

pub use error::{GridError, Result};
pub use session::CellGrid;
