//! Benchmark runner for the packing kernels.

use lowpack::{
    AddmodRounding, Exact8, PackKernel, PackedSideBlock, Quantization,
    QuantizationParams, SideMap, XorshiftRounding, pack_side_block_with_kernel,
};
use std::time::Instant;

const CELLS: usize = 3;

fn main() {
    println!("=== Operand Packing Benchmark ===\n");

    let sizes = [(96, 256), (384, 1024), (1536, 2048)];
    let iterations = 10;

    #[cfg(target_arch = "x86_64")]
    println!("CPU Features: SSE4.1={}\n", is_x86_feature_detected!("sse4.1"));

    for &(width, depth) in &sizes {
        println!("Side map: {}×{} (width × depth)", width, depth);
        println!("{}", "-".repeat(60));

        let data: Vec<u8> = (0..width * depth).map(|i| (i % 251) as u8).collect();
        let src = match SideMap::dense(&data, width, depth) {
            Ok(src) => src,
            Err(err) => {
                eprintln!("skipping {}×{}: {}", width, depth, err);
                continue;
            }
        };

        let mut results: Vec<(String, f64)> = Vec::new();
        for kernel in PackKernel::available() {
            results.push((
                format!("{} 8-bit", kernel.name()),
                bench_pack::<Exact8>(kernel, &src, iterations),
            ));
            results.push((
                format!("{} 7-bit addmod", kernel.name()),
                bench_pack::<Quantization<7, AddmodRounding>>(kernel, &src, iterations),
            ));
            results.push((
                format!("{} 4-bit xorshift", kernel.name()),
                bench_pack::<Quantization<4, XorshiftRounding>>(kernel, &src, iterations),
            ));
        }

        let bytes = (width * depth) as f64;
        for (i, (name, time_ms)) in results.iter().enumerate() {
            let gbps = bytes / (time_ms / 1000.0) / 1e9;
            println!("{}. {:22} {:8.3} ms  {:6.2} GB/s", i + 1, name, time_ms, gbps);
        }
        println!();
    }
}

/// Average time in milliseconds to pack `src` once.
fn bench_pack<Q: QuantizationParams>(
    kernel: PackKernel,
    src: &SideMap<'_>,
    iterations: usize,
) -> f64 {
    let fresh = || PackedSideBlock::<CELLS>::new(src.width(), src.depth());

    // Warmup
    if let Ok(mut dst) = fresh() {
        pack_side_block_with_kernel::<Q, CELLS>(kernel, src, &mut dst, &mut Q::Rounding::default());
    }

    let mut total = 0.0;
    for _ in 0..iterations {
        let Ok(mut dst) = fresh() else {
            return f64::NAN;
        };
        let mut rounding = Q::Rounding::default();
        let start = Instant::now();
        pack_side_block_with_kernel::<Q, CELLS>(kernel, src, &mut dst, &mut rounding);
        total += start.elapsed().as_secs_f64();
    }

    total / iterations as f64 * 1000.0
}
