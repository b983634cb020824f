//! Dispatcher, copy and extension behavior of `DensityMatrixArgs`

use approx::assert_abs_diff_eq;
use num_complex::{Complex, Complex64};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rhosim_core::gate::Gate;
use rhosim_core::{FailurePolicy, Operation, QuditId};
use rhosim_gates::{AmplitudeDamping, Hadamard, MeasurementGate, PauliX, QuditShift, RotationY};
use rhosim_state::{
    BufferedDensityMatrix, DensityMatrixArgs, Dispatch, InitialState, StateError, BUFFER_COUNT,
};
use std::sync::Arc;

/// No effect of its own; decomposes into X
#[derive(Debug)]
struct Composite;

impl Gate for Composite {
    fn name(&self) -> &str {
        "COMPOSITE"
    }

    fn num_qudits(&self) -> usize {
        1
    }

    fn decompose(&self, qudits: &[QuditId]) -> Option<Vec<Operation>> {
        Some(vec![Operation::new(Arc::new(PauliX), qudits).ok()?])
    }
}

/// Exposes nothing at all
#[derive(Debug)]
struct Opaque;

impl Gate for Opaque {
    fn name(&self) -> &str {
        "OPAQUE"
    }

    fn num_qudits(&self) -> usize {
        1
    }
}

fn c(re: f64) -> Complex64 {
    Complex64::new(re, 0.0)
}

fn args_on(qudits: &[QuditId], initial: InitialState<f64>) -> DensityMatrixArgs<f64, StdRng> {
    DensityMatrixArgs::new(qudits, &initial, StdRng::seed_from_u64(1234)).unwrap()
}

fn op(gate: impl Gate + 'static, qudits: &[QuditId]) -> Operation {
    Operation::new(Arc::new(gate), qudits).unwrap()
}

#[test]
fn test_default_buffers_match_state() {
    let args = args_on(&QuditId::range(0, 2), InitialState::Basis(0));
    let pool = args.state().available_buffer();
    assert_eq!(pool.len(), BUFFER_COUNT);
    for buffer in pool.iter() {
        assert_eq!(buffer.len(), args.density_matrix().len());
    }
}

#[test]
fn test_shallow_copy_buffers() {
    let args = args_on(&QuditId::range(0, 1), InitialState::Basis(0));
    let copy = args.copy(false);
    assert!(copy.state().shares_buffers_with(args.state()));
    assert_eq!(copy.density_matrix(), args.density_matrix());
}

#[test]
fn test_deep_copy_buffers() {
    let mut args = args_on(&QuditId::range(0, 1), InitialState::Basis(0));
    // leave something in the scratch buffers
    args.act_on(&op(Hadamard, &[QuditId::new(0)]), FailurePolicy::Strict)
        .unwrap();
    let copy = args.copy(true);
    assert!(!copy.state().shares_buffers_with(args.state()));
    assert_eq!(*copy.state().available_buffer(), *args.state().available_buffer());
}

#[test]
fn test_state_is_always_deep_copied() {
    let args = args_on(&QuditId::range(0, 1), InitialState::Basis(0));
    let mut copy = args.copy(false);
    copy.act_on(&op(PauliX, &[QuditId::new(0)]), FailurePolicy::Strict)
        .unwrap();
    assert_eq!(args.density_matrix()[0], c(1.0));
    assert_eq!(copy.density_matrix()[3], c(1.0));
}

#[test]
fn test_decomposed_fallback() {
    let q = QuditId::new(0);
    let mut decomposed = args_on(&[q], InitialState::Basis(0));
    let outcome = decomposed
        .act_on(&op(Composite, &[q]), FailurePolicy::Strict)
        .unwrap();
    assert_eq!(outcome, Dispatch::Decomposed);

    let mut direct = args_on(&[q], InitialState::Basis(0));
    direct.act_on(&op(PauliX, &[q]), FailurePolicy::Strict).unwrap();

    assert_eq!(decomposed.density_matrix(), direct.density_matrix());
    assert_eq!(decomposed.density_matrix(), &[c(0.0), c(0.0), c(0.0), c(1.0)]);
}

#[test]
fn test_cannot_act() {
    let q = QuditId::new(0);
    for initial in [InitialState::Basis(0), InitialState::Basis(1)] {
        let mut args = args_on(&[q], initial);
        let err = args.act_on(&op(Opaque, &[q]), FailurePolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            StateError::UnsupportedOperation {
                operation: "OPAQUE(q0)".to_string()
            }
        );
        assert!(err.to_string().contains("Can't simulate"));
    }
}

#[test]
fn test_best_effort_skips_and_keeps_state() {
    let q = QuditId::new(0);
    let mut args = args_on(&[q], InitialState::Basis(1));
    let before = args.density_matrix().to_vec();
    let outcome = args
        .act_on(&op(Opaque, &[q]), FailurePolicy::BestEffort)
        .unwrap();
    assert_eq!(outcome, Dispatch::Skipped);
    assert_eq!(args.density_matrix(), before.as_slice());
}

#[test]
fn test_best_effort_does_not_hide_shape_errors() {
    let mut args = args_on(&[QuditId::new(0)], InitialState::Basis(0));
    let stranger = op(PauliX, &[QuditId::new(1)]);
    assert!(matches!(
        args.act_on(&stranger, FailurePolicy::BestEffort),
        Err(StateError::UnknownQudit(_))
    ));
}

#[test]
fn test_with_qudits() {
    let (q0, q1) = (QuditId::new(0), QuditId::new(1));
    let args = args_on(&[q0], InitialState::Basis(1));
    let extended = args.with_qudits(&[q1]).unwrap();

    assert_eq!(extended.qudits(), vec![q0, q1]);
    assert_eq!(extended.qudit_map()[&q1], 1);
    // kron([[0, 0], [0, 1]], [[1, 0], [0, 0]])
    let mut expected = vec![c(0.0); 16];
    expected[2 * 4 + 2] = c(1.0);
    assert_eq!(extended.density_matrix(), expected.as_slice());
    // source untouched
    assert_eq!(args.qudits(), vec![q0]);
    assert_eq!(args.density_matrix().len(), 4);

    assert_eq!(
        extended.with_qudits(&[q0]).unwrap_err(),
        StateError::DuplicateQudit(q0)
    );
}

#[test]
fn test_with_qudits_preserves_reduced_state() {
    let qubit = QuditId::new(0);
    let qutrit = QuditId::with_dimension(1, 3).unwrap();
    let mut args = args_on(&[qubit, qutrit], InitialState::Basis(0));
    args.act_on(&op(RotationY::new(0.7), &[qubit]), FailurePolicy::Strict)
        .unwrap();
    args.act_on(&op(QuditShift::new(3), &[qutrit]), FailurePolicy::Strict)
        .unwrap();
    args.act_on(&op(AmplitudeDamping::new(0.3).unwrap(), &[qubit]), FailurePolicy::Strict)
        .unwrap();

    let extra = [QuditId::new(5), QuditId::with_dimension(6, 4).unwrap()];
    let extended = args.with_qudits(&extra).unwrap();
    assert_eq!(extended.state().qid_shape().dims(), &[2, 3, 2, 4]);

    let reduced = extended.reduced_density_matrix(&[qubit, qutrit]).unwrap();
    assert_eq!(reduced.as_slice(), args.density_matrix());
}

#[test]
fn test_mixed_dimension_targets() {
    let qubit = QuditId::new(0);
    let qutrit = QuditId::with_dimension(1, 3).unwrap();
    let mut args = args_on(&[qubit, qutrit], InitialState::Basis(0));
    args.act_on(&op(QuditShift::new(3), &[qutrit]), FailurePolicy::Strict)
        .unwrap();
    args.act_on(&op(PauliX, &[qubit]), FailurePolicy::Strict).unwrap();
    // |1, 1⟩ on (2, 3) is index 4
    assert_eq!(args.density_matrix()[4 * 6 + 4], c(1.0));

    let reduced = args.reduced_density_matrix(&[qutrit]).unwrap();
    assert_eq!(reduced[1 * 3 + 1], c(1.0));
}

#[test]
fn test_measurement_log() {
    let q = QuditId::range(0, 2);
    let mut args = args_on(&q, InitialState::Basis(0));
    args.act_on(&op(PauliX, &[q[1]]), FailurePolicy::Strict).unwrap();
    args.act_on(&MeasurementGate::on("m", &q).unwrap(), FailurePolicy::Strict)
        .unwrap();
    assert_eq!(args.log_of_measurement_results()["m"], vec![0, 1]);

    let again = MeasurementGate::on("m", &q[..1]).unwrap();
    assert_eq!(
        args.act_on(&again, FailurePolicy::BestEffort).unwrap_err(),
        StateError::DuplicateMeasurementKey("m".to_string())
    );
}

#[test]
fn test_measurement_statistics_follow_state() {
    let q = QuditId::new(0);
    let mut ones = 0;
    for seed in 0..200 {
        let mut args =
            DensityMatrixArgs::<f64, _>::new(&[q], &InitialState::Basis(0), StdRng::seed_from_u64(seed))
                .unwrap();
        args.act_on(&op(Hadamard, &[q]), FailurePolicy::Strict).unwrap();
        args.act_on(&MeasurementGate::on("m", &[q]).unwrap(), FailurePolicy::Strict)
            .unwrap();
        ones += args.log_of_measurement_results()["m"][0];
        assert_abs_diff_eq!(args.state().trace(), 1.0, epsilon = 1e-12);
    }
    assert!((60..140).contains(&ones), "ones = {}", ones);
}

#[test]
fn test_kronecker_product_of_args() {
    let a = args_on(&[QuditId::new(0)], InitialState::Basis(1));
    let b = args_on(&[QuditId::new(1)], InitialState::Basis(0));
    let joined = a.kronecker_product(&b).unwrap();
    assert_eq!(
        joined.density_matrix(),
        a.with_qudits(&[QuditId::new(1)]).unwrap().density_matrix()
    );
    assert!(matches!(
        a.kronecker_product(&a),
        Err(StateError::DuplicateQudit(_))
    ));
}

#[test]
fn test_single_precision_dispatch() {
    let q = QuditId::new(0);
    let mut args = DensityMatrixArgs::<f32, _>::new(&[q], &InitialState::Basis(0), StdRng::seed_from_u64(0))
        .unwrap();
    args.act_on(&op(Hadamard, &[q]), FailurePolicy::Strict).unwrap();
    for v in args.density_matrix() {
        assert_abs_diff_eq!(v.re, 0.5f32, epsilon = 1e-6);
    }
    let state: &BufferedDensityMatrix<f32> = args.state();
    assert_abs_diff_eq!(state.purity(), 1.0f32, epsilon = 1e-6);
    let _: &Complex<f32> = &args.density_matrix()[0];
}
