//! Read-only width-major view over one operand of the multiply.

use crate::error::{PackError, Result};

/// A `width x depth` window over `u8` data where element `(w, d)` lives at
/// `w * stride + d`: each column is a contiguous run along the depth axis.
#[derive(Debug, Clone, Copy)]
pub struct SideMap<'a> {
    data: &'a [u8],
    width: usize,
    depth: usize,
    stride: usize,
}

impl<'a> SideMap<'a> {
    /// Builds a view, checking that `data` covers every addressed byte.
    pub fn new(data: &'a [u8], width: usize, depth: usize, stride: usize) -> Result<Self> {
        if width == 0 || depth == 0 {
            return Err(PackError::InvalidGeometry(format!(
                "empty side map {}x{}",
                width, depth
            )));
        }
        if stride < depth {
            return Err(PackError::InvalidGeometry(format!(
                "width stride {} is shorter than depth {}",
                stride, depth
            )));
        }
        let needed = (width - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(depth))
            .ok_or_else(|| {
                PackError::InvalidGeometry(format!(
                    "{} columns at stride {} overflow the address space",
                    width, stride
                ))
            })?;
        if data.len() < needed {
            return Err(PackError::SourceTooShort {
                len: data.len(),
                needed,
            });
        }
        Ok(Self {
            data,
            width,
            depth,
            stride,
        })
    }

    /// A densely packed `width x depth` view (stride equals depth).
    pub fn dense(data: &'a [u8], width: usize, depth: usize) -> Result<Self> {
        Self::new(data, width, depth, depth)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Distance in bytes between two consecutive columns.
    pub fn width_stride(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    pub fn get(&self, w: usize, d: usize) -> u8 {
        debug_assert!(w < self.width && d < self.depth);
        self.data[w * self.stride + d]
    }

    /// The bytes of column `w` from depth `d` to the end of the view.
    #[inline(always)]
    pub fn row(&self, w: usize, d: usize) -> &'a [u8] {
        debug_assert!(w < self.width && d < self.depth);
        let start = w * self.stride + d;
        &self.data[start..start + self.depth - d]
    }

    /// Sub-view starting at `(start_width, start_depth)`.
    ///
    /// # Panics
    ///
    /// Panics if the block does not fit inside this view.
    pub fn block(
        &self,
        start_width: usize,
        start_depth: usize,
        width: usize,
        depth: usize,
    ) -> SideMap<'a> {
        assert!(width > 0 && depth > 0, "empty block {}x{}", width, depth);
        assert!(
            start_width <= self.width
                && width <= self.width - start_width
                && start_depth <= self.depth
                && depth <= self.depth - start_depth,
            "block {}x{} at ({}, {}) exceeds {}x{} side map",
            width,
            depth,
            start_width,
            start_depth,
            self.width,
            self.depth
        );
        let start = start_width * self.stride + start_depth;
        let end = start + (width - 1) * self.stride + depth;
        SideMap {
            data: &self.data[start..end],
            width,
            depth,
            stride: self.stride,
        }
    }

    /// Dense view over a buffer the caller has sized to `width * depth`.
    pub(crate) fn from_dense_buffer(data: &'a [u8], width: usize, depth: usize) -> Self {
        debug_assert_eq!(data.len(), width * depth);
        Self {
            data,
            width,
            depth,
            stride: depth,
        }
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }
}
