use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use mechsynth::interface::SynthesisInterface;
use mechsynth::observe::Unobserved;
use mechsynth::persist::{parse_candidates, parse_rules, parse_task};
use mechsynth::search::Engine;
use mechsynth::topology::{JointType, MechanismGraph};

const TASK: &str = include_str!("../demos/door_latch_task.json");
const RULES: &str = include_str!("../demos/transformation_rules.json");
const CANDIDATES: &str = include_str!("../demos/candidates.json");

// ------------- Topology -------------
fn ladder(rungs: usize) -> MechanismGraph {
    let elements = rungs * 2;
    let mut graph = MechanismGraph::new(elements).unwrap();
    for a in 0..elements - 2 {
        graph.connect(a, a + 2, JointType::Revolute).unwrap();
    }
    for rung in 0..rungs {
        graph.connect(rung * 2, rung * 2 + 1, JointType::Prismatic).unwrap();
    }
    graph
}

fn topology_benchmarks(c: &mut Criterion) {
    let graph = ladder(16);
    c.bench_function("dof_32_elements", |b| b.iter(|| black_box(&graph).calculate_dof()));
    c.bench_function("connectivity_32_elements", |b| b.iter(|| black_box(&graph).connectivity()));
}

// ------------- Search -------------
fn search_benchmarks(c: &mut Criterion) {
    let task = parse_task(TASK).unwrap();
    let rules = parse_rules(RULES).unwrap();
    let candidates = parse_candidates(CANDIDATES).unwrap();
    let seed = candidates[0].topology.clone();

    c.bench_function("door_latch_search", |b| {
        b.iter(|| {
            Engine::new(&task, &rules)
                .run(black_box(&seed), &mut Unobserved)
                .unwrap()
        })
    });

    let interface = SynthesisInterface::new(task.clone(), rules.clone());
    c.bench_function("door_latch_all_candidates", |b| {
        b.iter(|| interface.run_all(black_box(&candidates)).unwrap())
    });
}

criterion_group!(benches, topology_benchmarks, search_benchmarks);
criterion_main!(benches);
