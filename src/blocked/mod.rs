//! Block-level packing on top of the register-block kernels.
//!
//! These functions cut a side map into register blocks, pad the blocks at
//! the edges, and feed them to a kernel in the order the packed layout
//! expects.
//!
//! - `register_block`: zero-padded completion of edge blocks
//! - `pack_side`: the whole-side driver, with fixed or depth-chosen rounding

pub mod pack_side;
pub mod register_block;
