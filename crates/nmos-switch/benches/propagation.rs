//! Benchmarks for propagation through long gate chains.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nmos_switch::{Network, NetworkDescription, TransistorDef};

const POWER: usize = 0;
const GROUND: usize = 1;

/// Input node 2 followed by `stages` NMOS inverters.
fn inverter_chain(stages: usize) -> Network {
    let mut pullups = vec![false, false, false];
    let mut transistors = Vec::with_capacity(stages);
    for i in 0..stages {
        let input = 2 + i;
        let out = input + 1;
        pullups.push(true);
        transistors.push(TransistorDef::new(input, out, GROUND));
    }
    let desc = NetworkDescription {
        pullups,
        transistors,
        power: POWER,
        ground: GROUND,
    };
    let mut net = Network::new(&desc).expect("valid chain");
    net.stabilize();
    net
}

fn bench_toggle_input(c: &mut Criterion) {
    let mut group = c.benchmark_group("inverter_chain_toggle");
    for stages in [100, 1_000, 3_500] {
        let mut net = inverter_chain(stages);
        let mut level = false;
        group.bench_with_input(BenchmarkId::from_parameter(stages), &stages, |b, _| {
            b.iter(|| {
                level = !level;
                net.set(2, level);
                net.recalc();
                black_box(net.get(2 + stages));
            });
        });
    }
    group.finish();
}

fn bench_stabilize(c: &mut Criterion) {
    let mut net = inverter_chain(3_500);
    c.bench_function("stabilize_3500_stages", |b| {
        b.iter(|| {
            net.stabilize();
            black_box(net.get(3));
        });
    });
}

criterion_group!(benches, bench_toggle_input, bench_stabilize);
criterion_main!(benches);
