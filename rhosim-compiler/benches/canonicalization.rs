//! Benchmarks for the canonicalization pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rhosim_compiler::passes::{MergeSingleQuditUnitaries, OptimizationPass};
use rhosim_compiler::{converted_gate_set, Pipeline, PipelineConfig};
use rhosim_core::gate::Gate;
use rhosim_core::{Circuit, QuditId};
use rhosim_gates::{CNot, Hadamard, RotationX, RotationZ, SGate, TGate};
use std::sync::Arc;

/// Layers of single-qubit gates separated by a CNOT ladder
fn layered_circuit(num_qubits: usize, layers: usize) -> Circuit {
    let q = QuditId::range(0, num_qubits);
    let singles: Vec<Arc<dyn Gate>> = vec![
        Arc::new(Hadamard),
        Arc::new(TGate),
        Arc::new(SGate),
        Arc::new(RotationX::new(0.37)),
        Arc::new(RotationZ::new(-1.2)),
    ];

    let mut circuit = Circuit::new();
    for layer in 0..layers {
        for (i, &qubit) in q.iter().enumerate() {
            for k in 0..3 {
                let gate = Arc::clone(&singles[(layer + i + k) % singles.len()]);
                circuit.append_gate(gate, &[qubit]).unwrap();
            }
        }
        for pair in q.windows(2) {
            circuit.append_gate(Arc::new(CNot), pair).unwrap();
        }
    }
    circuit
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("converted_gate_set");

    for num_qubits in [2usize, 4, 8] {
        let circuit = layered_circuit(num_qubits, 10);
        group.bench_with_input(
            BenchmarkId::new("keep_clifford", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| converted_gate_set(black_box(circuit), false, 1e-8).unwrap());
            },
        );
        group.bench_with_input(
            BenchmarkId::new("no_clifford", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| converted_gate_set(black_box(circuit), true, 1e-8).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_single_qudit");
    let pass = MergeSingleQuditUnitaries::default();

    for layers in [5usize, 20, 50] {
        let circuit = layered_circuit(4, layers);
        group.bench_with_input(BenchmarkId::from_parameter(layers), &circuit, |b, circuit| {
            b.iter(|| {
                let mut circuit = circuit.clone();
                pass.apply(black_box(&mut circuit)).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_idempotent_rerun(c: &mut Criterion) {
    let pipeline = Pipeline::canonical(&PipelineConfig::default());
    let converted = converted_gate_set(&layered_circuit(6, 10), false, 1e-8).unwrap();

    c.bench_function("rerun_on_canonical", |b| {
        b.iter(|| {
            let mut circuit = converted.clone();
            pipeline.run(black_box(&mut circuit)).unwrap()
        });
    });
}

criterion_group!(benches, bench_pipeline, bench_merge, bench_idempotent_rerun);
criterion_main!(benches);
