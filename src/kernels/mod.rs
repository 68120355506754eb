//! Packing kernels for one register block.
//!
//! Both kernels read a `KERNEL_WIDTH x REGISTER_SIZE` width-major block,
//! requantize it, interleave it into 4x2 cells, add per-column sums and
//! advance the destination cursor. Their output is bit-identical.
//!
//! Available kernels:
//! - `pack_sse`: SSE4.1 (x86_64 only)
//! - `pack_scalar`: portable scalar reference

#[cfg(target_arch = "x86_64")]
pub mod pack_sse;
pub mod pack_scalar;

use crate::layout::cell::{KernelSideFormat, REGISTER_SIZE};
use crate::layout::{PackedSideBlock, SideMap};
use crate::quant::QuantizationParams;

/// Which packing kernel to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackKernel {
    #[cfg(target_arch = "x86_64")]
    Sse41,
    Scalar,
}

impl PackKernel {
    /// Picks the fastest kernel the CPU supports (SSE4.1 > scalar).
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("sse4.1") {
                log::debug!("packing with the SSE4.1 kernel");
                return PackKernel::Sse41;
            }
        }
        log::debug!("SSE4.1 not available, packing with the scalar kernel");
        PackKernel::Scalar
    }

    /// Every kernel this CPU can run, fastest first.
    pub fn available() -> Vec<PackKernel> {
        let mut kernels = Vec::new();
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("sse4.1") {
                kernels.push(PackKernel::Sse41);
            }
        }
        kernels.push(PackKernel::Scalar);
        kernels
    }

    pub fn name(self) -> &'static str {
        match self {
            #[cfg(target_arch = "x86_64")]
            PackKernel::Sse41 => "SSE4.1",
            PackKernel::Scalar => "scalar",
        }
    }

    /// Packs one register block with this kernel.
    ///
    /// # Panics
    ///
    /// Panics if the kernel is not supported by the CPU, or on the geometry
    /// errors listed for the kernels.
    #[inline]
    pub fn pack<Q: QuantizationParams, const CELLS: usize>(
        self,
        src: &SideMap<'_>,
        dst: &mut PackedSideBlock<CELLS>,
        start_width: usize,
        rounding: &mut Q::Rounding,
    ) {
        match self {
            #[cfg(target_arch = "x86_64")]
            PackKernel::Sse41 => {
                assert!(is_x86_feature_detected!("sse4.1"), "CPU does not support SSE4.1");
                unsafe {
                    pack_sse::pack_register_block_sse41::<Q, CELLS>(src, dst, start_width, rounding)
                }
            }
            PackKernel::Scalar => {
                pack_scalar::pack_register_block_scalar::<Q, CELLS>(src, dst, start_width, rounding)
            }
        }
    }
}

/// Checks what the kernels rely on, once per register block.
#[inline]
pub(crate) fn check_register_block<const CELLS: usize>(
    src: &SideMap<'_>,
    dst: &PackedSideBlock<CELLS>,
    start_width: usize,
) {
    let kernel_width = KernelSideFormat::<CELLS>::KERNEL_WIDTH;
    assert!(
        src.width() == kernel_width && src.depth() == REGISTER_SIZE,
        "register block must be {}x{}, got {}x{}",
        kernel_width,
        REGISTER_SIZE,
        src.width(),
        src.depth()
    );
    assert!(
        dst.remaining() >= KernelSideFormat::<CELLS>::REGISTER_BLOCK_BYTES,
        "packed block has {} bytes left, register block needs {}",
        dst.remaining(),
        KernelSideFormat::<CELLS>::REGISTER_BLOCK_BYTES
    );
    let columns = dst.sums_of_each_slice().len();
    assert!(
        start_width <= columns && kernel_width <= columns - start_width,
        "{} columns from {} outside {} column sums",
        kernel_width,
        start_width,
        columns
    );
}
