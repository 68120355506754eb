//! Memory layouts on both sides of the packing kernels.
//!
//! - `side_map`: the width-major source view
//! - `cell`: the 4x2 cell and `CELLS`-wide kernel-side formats
//! - `packed_block`: the packed destination with its cursor and column sums

pub mod cell;
pub mod packed_block;
pub mod side_map;

pub use cell::{CellFormat, KernelSideFormat};
pub use packed_block::PackedSideBlock;
pub use side_map::SideMap;
