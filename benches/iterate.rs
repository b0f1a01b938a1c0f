use criterion::*;
use std::hint::black_box;

mod common;
use common::*;

fn integrate(world: &mut archway::World) {
    for (positions, velocities) in world.iter::<(&mut Position, &Velocity)>() {
        for (position, velocity) in positions.iter_mut().zip(velocities) {
            position.x += velocity.dx;
            position.y += velocity.dy;
        }
    }
}

fn iterate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    for &(label, n) in &[
        ("iterate_100k", AGENTS_SMALL),
        ("iterate_1M", AGENTS_MED),
    ] {
        let mut world = make_world();
        populate_mixed(&mut world, n).unwrap();

        group.bench_function(label, |b| {
            b.iter(|| {
                integrate(&mut world);
                black_box(&world);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, iterate_benchmark);
criterion_main!(benches);
