//! Cell and kernel-side formats of the packed operand.
//!
//! A cell is the smallest tile the multiply kernel reads contiguously: 4
//! columns by 2 depth positions, stored width-major (both depth values of
//! column 0, then column 1, ...). A kernel-side format puts `CELLS` cells
//! side by side, so one depth-cell row of a packed panel covers
//! `4 * CELLS` columns.

/// Shape of one packed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellFormat {
    pub width: usize,
    pub depth: usize,
}

impl CellFormat {
    pub const WIDTH_MAJOR_4X2: CellFormat = CellFormat { width: 4, depth: 2 };

    pub const fn size(&self) -> usize {
        self.width * self.depth
    }

    /// Byte offset of `(w, d)` inside the cell.
    pub const fn offset(&self, w: usize, d: usize) -> usize {
        w * self.depth + d
    }
}

pub const CELL: CellFormat = CellFormat::WIDTH_MAJOR_4X2;
pub const CELL_WIDTH: usize = CELL.width;
pub const CELL_DEPTH: usize = CELL.depth;
pub const CELL_SIZE: usize = CELL.size();

/// Depth positions consumed by one call of the packing kernel.
pub const REGISTER_SIZE: usize = 16;

/// Depth positions handled per kernel strip: one 8-byte load per source row.
pub const DEPTH_STEP: usize = 8;

/// `CELLS` width-major 4x2 cells side by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelSideFormat<const CELLS: usize>;

impl<const CELLS: usize> KernelSideFormat<CELLS> {
    pub const CELLS: usize = {
        assert!(CELLS > 0, "a kernel side needs at least one cell");
        CELLS
    };
    pub const KERNEL_WIDTH: usize = CELL_WIDTH * Self::CELLS;

    /// Bytes of one depth-cell row (all cells at one depth-cell index).
    pub const ROW_BYTES: usize = CELL_SIZE * Self::CELLS;

    /// Bytes written by one register block.
    pub const REGISTER_BLOCK_BYTES: usize = Self::KERNEL_WIDTH * REGISTER_SIZE;

    /// Cells the destination cursor moves past per register block.
    pub const CELLS_PER_REGISTER_BLOCK: usize = Self::CELLS * REGISTER_SIZE / CELL_DEPTH;

    /// Byte offset of `(w, d)` inside one packed panel of this format,
    /// `w < KERNEL_WIDTH`.
    pub const fn panel_offset(w: usize, d: usize) -> usize {
        (d / CELL_DEPTH) * Self::ROW_BYTES
            + (w / CELL_WIDTH) * CELL_SIZE
            + CELL.offset(w % CELL_WIDTH, d % CELL_DEPTH)
    }
}
