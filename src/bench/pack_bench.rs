use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lowpack::{
    Exact8, PackKernel, PackedSideBlock, Quantization, QuantizationParams, SideMap,
    XorshiftRounding, pack_side_block_with_kernel,
};

const CELLS: usize = 3;

fn bench_side<Q: QuantizationParams>(c: &mut Criterion, group_name: &str) {
    let mut group = c.benchmark_group(group_name);

    for &(width, depth) in &[(96usize, 256usize), (384, 1024)] {
        let data: Vec<u8> = (0..width * depth).map(|i| (i % 251) as u8).collect();
        let src = SideMap::dense(&data, width, depth).unwrap();
        group.throughput(Throughput::Bytes((width * depth) as u64));

        for kernel in PackKernel::available() {
            group.bench_with_input(
                BenchmarkId::new(kernel.name(), format!("{}x{}", width, depth)),
                &src,
                |b, src| {
                    b.iter(|| {
                        let mut dst = PackedSideBlock::<CELLS>::new(width, depth).unwrap();
                        let mut rounding = Q::Rounding::default();
                        pack_side_block_with_kernel::<Q, CELLS>(
                            kernel,
                            src,
                            &mut dst,
                            &mut rounding,
                        );
                        black_box(dst);
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_pack_8bit(c: &mut Criterion) {
    bench_side::<Exact8>(c, "pack/8bit");
}

fn bench_pack_4bit(c: &mut Criterion) {
    bench_side::<Quantization<4, XorshiftRounding>>(c, "pack/4bit_xorshift");
}

criterion_group!(benches, bench_pack_8bit, bench_pack_4bit);
criterion_main!(benches);
