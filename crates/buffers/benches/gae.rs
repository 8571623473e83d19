use buffers::RolloutBuffer;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tensor::{Key, Tensor};

fn rollout(len: usize, envs: usize) -> RolloutBuffer<(), (), ()> {
    let (rewards, values) = Key::new(0).split();
    let shape = vec![len, envs];
    RolloutBuffer::builder()
        .observations(())
        .actions(())
        .rewards(rewards.uniform(shape.clone(), -1.0, 1.0))
        .terminations(Tensor::full(shape.clone(), false))
        .truncations(Tensor::full(shape.clone(), false))
        .log_probs(Tensor::zeros(shape.clone()))
        .values(values.uniform(shape, -1.0, 1.0))
        .states(())
        .build()
        .expect("benchmark buffer is well formed")
}

fn bench_gae(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_returns_and_advantages");
    for len in [128, 1024] {
        let buffer = rollout(len, 8);
        group.bench_with_input(BenchmarkId::from_parameter(len), &buffer, |b, buffer| {
            b.iter(|| {
                buffer
                    .compute_returns_and_advantages(
                        Tensor::zeros(vec![8]),
                        Tensor::full(vec![8], false),
                        black_box(0.95),
                        black_box(0.99),
                    )
                    .expect("shapes match")
            });
        });
    }
    group.finish();
}

fn bench_batches(c: &mut Criterion) {
    let buffer = rollout(2048, 1);
    c.bench_function("batches_shuffled_2048x1", |b| {
        b.iter(|| {
            buffer
                .batches(black_box(64), Some(Key::new(7)))
                .expect("batch size divides the rollout")
        });
    });
}

criterion_group!(benches, bench_gae, bench_batches);
criterion_main!(benches);
