//! Cross-module tests for the gate library

use approx::assert_relative_eq;
use num_complex::Complex64;
use rhosim_core::gate::Gate;
use rhosim_core::QuditId;
use rhosim_gates::matrices::{flatten, HADAMARD, S_GATE};
use rhosim_gates::matrix_ops::{approx_eq_up_to_phase, identity, is_unitary, multiply, tensor_product};
use rhosim_gates::*;
use std::collections::HashSet;
use std::f64::consts::PI;

const EPSILON: f64 = 1e-10;

fn unitary_of_sequence(ops: &[rhosim_core::Operation], qudits: &[QuditId]) -> Vec<Complex64> {
    let dim = 1 << qudits.len();
    let mut total = identity(dim);
    for op in ops {
        let gate = op.matrix().unwrap();
        // Embed single- and two-qubit gates on a two-qubit register
        let full = match op.qudits() {
            [q] if *q == qudits[0] => tensor_product(&gate, 2, &identity(2), 2),
            [q] if *q == qudits[1] => tensor_product(&identity(2), 2, &gate, 2),
            [a, b] if *a == qudits[0] && *b == qudits[1] => gate,
            [a, b] if *a == qudits[1] && *b == qudits[0] => {
                let swap = flatten(&matrices::SWAP);
                multiply(&multiply(&swap, &gate, 4), &swap, 4)
            }
            other => panic!("unexpected qudits {:?}", other),
        };
        total = multiply(&full, &total, dim);
    }
    total
}

#[test]
fn test_all_fixed_gates_are_unitary() {
    let gates: Vec<Box<dyn Gate>> = vec![
        Box::new(Identity),
        Box::new(PauliX),
        Box::new(PauliY),
        Box::new(PauliZ),
        Box::new(Hadamard),
        Box::new(SGate),
        Box::new(TGate),
        Box::new(CZ),
        Box::new(CNot),
        Box::new(Swap),
        Box::new(RotationX::new(0.4)),
        Box::new(RotationY::new(1.1)),
        Box::new(RotationZ::new(-2.3)),
        Box::new(QuditShift::new(5)),
    ];
    for gate in gates {
        let dim: usize = gate.qid_shape().iter().product();
        let m = gate.matrix().unwrap();
        assert_eq!(m.len(), dim * dim, "{}", gate.name());
        assert!(is_unitary(&m, dim, EPSILON), "{}", gate.name());
    }
}

#[test]
fn test_rotation_by_pi_is_pauli_up_to_phase() {
    assert!(approx_eq_up_to_phase(
        &RotationX::new(PI).matrix().unwrap(),
        &PauliX.matrix().unwrap(),
        EPSILON
    ));
    assert!(approx_eq_up_to_phase(
        &RotationZ::new(PI).matrix().unwrap(),
        &PauliZ.matrix().unwrap(),
        EPSILON
    ));
}

#[test]
fn test_swap_decomposition_matches_matrix() {
    let qudits = QuditId::range(0, 2);
    let ops = Swap.decompose(&qudits).unwrap();
    assert_eq!(ops.len(), 3);
    let combined = unitary_of_sequence(&ops, &qudits);
    assert!(approx_eq_up_to_phase(&combined, &Swap.matrix().unwrap(), EPSILON));
}

#[test]
fn test_two_qubit_phasor_decomposition_matches_matrix() {
    let qudits = QuditId::range(0, 2);
    for paulis in [
        vec![Pauli::Z, Pauli::Z],
        vec![Pauli::X, Pauli::Z],
        vec![Pauli::Y, Pauli::X],
    ] {
        let gate = PauliStringPhasorGate::new(paulis, 0.3, -0.15);
        let ops = gate.decompose(&qudits).unwrap();
        let combined = unitary_of_sequence(&ops, &qudits);
        assert!(
            approx_eq_up_to_phase(&combined, &gate.matrix().unwrap(), EPSILON),
            "{}",
            gate.name()
        );
    }
    let single = PauliStringPhasorGate::rotation(vec![Pauli::X], 0.2);
    assert!(single.decompose(&qudits[..1]).is_none());
}

#[test]
fn test_cnot_decomposition_uses_cz() {
    let qudits = QuditId::range(0, 2);
    let ops = CNot.decompose(&qudits).unwrap();
    let names: Vec<_> = ops.iter().map(|op| op.gate().name().to_string()).collect();
    assert_eq!(names, vec!["H", "CZ", "H"]);
    let combined = unitary_of_sequence(&ops, &qudits);
    assert!(approx_eq_up_to_phase(&combined, &CNot.matrix().unwrap(), EPSILON));
}

#[test]
fn test_single_qubit_clifford_group_has_24_elements() {
    let h = flatten(&HADAMARD);
    let s = flatten(&S_GATE);

    let mut seen = HashSet::new();
    let mut frontier = vec![identity(2)];
    while let Some(u) = frontier.pop() {
        let gate = SingleQubitCliffordGate::from_unitary(&u, 1e-9).unwrap();
        if seen.insert((gate.x_to(), gate.z_to())) {
            frontier.push(multiply(&h, &u, 2));
            frontier.push(multiply(&s, &u, 2));
        }
    }
    assert_eq!(seen.len(), 24);
}

#[test]
fn test_clifford_matrix_reproduces_input_up_to_phase() {
    let u = multiply(&flatten(&HADAMARD), &flatten(&S_GATE), 2);
    let gate = SingleQubitCliffordGate::from_unitary(&u, 1e-9).unwrap();
    assert!(approx_eq_up_to_phase(&gate.matrix().unwrap(), &u, EPSILON));
}

#[test]
fn test_phasor_half_turns_round_trip() {
    let gate = PauliStringPhasorGate::rotation(vec![Pauli::X], 0.25);
    assert_relative_eq!(gate.half_turns(), 0.25, epsilon = EPSILON);
    assert_relative_eq!(gate.exponent_neg(), 0.125, epsilon = EPSILON);
    assert_relative_eq!(gate.exponent_pos(), -0.125, epsilon = EPSILON);
}

#[test]
fn test_depolarizing_full_noise_weights() {
    let channel = DepolarizingChannel::new(0.75).unwrap();
    let kraus = channel.kraus().unwrap();
    assert_relative_eq!(kraus[0][0].re, 0.5, epsilon = EPSILON);
    assert_relative_eq!(kraus[1][1].re, 0.5, epsilon = EPSILON);
}

#[test]
fn test_measurement_gate_has_no_effect_matrix() {
    let op = MeasurementGate::on("m", &[QuditId::new(3)]).unwrap();
    assert!(op.matrix().is_none());
    assert_eq!(op.gate().measurement_key(), Some("m"));
}
