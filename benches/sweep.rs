use criterion::{black_box, Criterion, criterion_group, criterion_main};
use jacobi_dd::core::{HaloField, Problem};
use jacobi_dd::partition::{Partition, Topology};
use jacobi_dd::problem::{Poisson1d, Poisson2d};
use jacobi_dd::stencil::{sweep_five_point, sweep_three_point};

fn fields<P: Problem>(problem: &P) -> (HaloField, HaloField) {
    let topology = Topology::new(0, 1);
    let partition = Partition::for_topology(problem.num_points(), &topology).unwrap();
    let width = problem.line_width();
    let mut current = HaloField::zeros(partition.local_count(), width);
    let mut source = HaloField::zeros(partition.local_count(), width);
    problem.initialize(&partition, &topology, &mut current, &mut source);
    (current, source)
}

fn bench_sweeps(c: &mut Criterion) {
    let p1 = Poisson1d::reference(100_000);
    let (prev, src) = fields(&p1);
    let mut cur = prev.clone();
    c.bench_function("three-point sweep, n=100000", |ben| {
        ben.iter(|| sweep_three_point(black_box(&prev), black_box(&src), &mut cur, p1.dx()))
    });

    let p2 = Poisson2d::reference(256);
    let (prev, src) = fields(&p2);
    let mut cur = prev.clone();
    c.bench_function("five-point sweep, 256x256", |ben| {
        ben.iter(|| sweep_five_point(black_box(&prev), black_box(&src), &mut cur, p2.dx()))
    });
}

criterion_group!(benches, bench_sweeps);
criterion_main!(benches);
